//! Character classes used by the heuristics.

use std::collections::HashSet;

/// Primary alphabet: the Russian Cyrillic letters
pub fn is_primary(ch: char) -> bool {
    matches!(ch, 'А'..='я' | 'Ё' | 'ё')
}

/// Latin letters
pub fn is_latin(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Characters that end a sentence
pub(crate) fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

/// Punctuation after which a control tail may start
pub(crate) fn is_marker_punctuation(ch: char) -> bool {
    is_sentence_end(ch) || matches!(ch, ',' | ';' | ':')
}

/// Straight and typographic quotes
pub(crate) fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '«' | '»' | '“' | '”' | '„')
}

/// Punctuation counted by the density check
pub(crate) fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation() || matches!(ch, '«' | '»' | '“' | '”' | '„' | '…' | '–' | '—')
}

/// Branch and choice markers that may open a dialog line
pub(crate) fn is_structure_marker(ch: char) -> bool {
    matches!(ch, '|' | '>')
}

/// `chars` without one leading branch or choice marker and the spaces after it
pub(crate) fn without_structure_prefix(chars: &[char]) -> &[char] {
    match chars.split_first() {
        Some((&first, rest)) if is_structure_marker(first) => {
            let spaces = rest.iter().take_while(|c| c.is_whitespace()).count();
            &rest[spaces..]
        }
        _ => chars,
    }
}

/// Letter and symbol counts for a run of characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharProfile {
    /// All characters
    pub total: usize,
    /// Non-whitespace characters
    pub non_space: usize,
    /// Primary-alphabet letters
    pub primary: usize,
    /// Latin letters
    pub latin: usize,
    /// Characters from the unusual set
    pub unusual: usize,
    /// Punctuation characters
    pub punctuation: usize,
    /// Whitespace characters
    pub spaces: usize,
}

impl CharProfile {
    /// Profiles `chars` against the `unusual` set
    pub fn of(chars: &[char], unusual: &HashSet<char>) -> Self {
        let mut profile = Self {
            total: chars.len(),
            ..Self::default()
        };
        for &ch in chars {
            if ch.is_whitespace() {
                profile.spaces += 1;
                continue;
            }
            profile.non_space += 1;
            if is_primary(ch) {
                profile.primary += 1;
            } else if is_latin(ch) {
                profile.latin += 1;
            }
            if unusual.contains(&ch) {
                profile.unusual += 1;
            }
            if is_punctuation(ch) {
                profile.punctuation += 1;
            }
        }
        profile
    }

    /// Any letter of either alphabet
    pub fn has_letters(&self) -> bool {
        self.primary + self.latin > 0
    }

    /// More Latin than Cyrillic letters
    pub fn is_latin_dominant(&self) -> bool {
        self.latin > self.primary
    }

    /// `part / total`, zero for empty runs
    pub fn ratio(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            part as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_alphabet() {
        assert!(is_primary('Ж'));
        assert!(is_primary('ё'));
        assert!(!is_primary('ї'));
        assert!(!is_primary('Џ'));
        assert!(!is_primary('z'));
    }

    #[test]
    fn test_structure_prefix() {
        let chars: Vec<char> = "> Choice 1".chars().collect();
        assert_eq!(without_structure_prefix(&chars).iter().collect::<String>(), "Choice 1");
        let chars: Vec<char> = "|Second".chars().collect();
        assert_eq!(without_structure_prefix(&chars).len(), 6);
        let chars: Vec<char> = "Да > нет".chars().collect();
        assert_eq!(without_structure_prefix(&chars), &chars[..]);
    }

    #[test]
    fn test_profile_counts() {
        let unusual: HashSet<char> = ['Џ'].into_iter().collect();
        let chars: Vec<char> = "Да, ok Џ".chars().collect();
        let profile = CharProfile::of(&chars, &unusual);
        assert_eq!(profile.total, 8);
        assert_eq!(profile.spaces, 2);
        assert_eq!(profile.primary, 2);
        assert_eq!(profile.latin, 2);
        assert_eq!(profile.unusual, 1);
        assert_eq!(profile.punctuation, 1);
        assert!(!profile.is_latin_dominant());
    }
}
