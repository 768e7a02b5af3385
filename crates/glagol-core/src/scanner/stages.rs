//! Named heuristic stages.
//!
//! Each stage looks at one [`Candidate`] and either keeps it (possibly after
//! modifying it) or rejects it. Stages run in a fixed order:
//!
//! | Stage | Pass | Purpose |
//! |---|---|---|
//! | `validate` | first | reject runs that cannot be dialog text |
//! | `trailing-marker` | first | peel control markers off the end |
//! | `reference` | first | reject file names and script paths |
//! | `control-code` | second | reject text-looking control codes |
//!
//! The second pass only runs once the first pass has finished over the whole
//! file, so it sees the candidate list after every marker has been peeled.

use super::classify::{
    is_latin, is_marker_punctuation, is_primary, is_quote, is_sentence_end,
    without_structure_prefix, CharProfile,
};
use super::raw::RawRun;
use crate::error::Error;
use crate::rules::Rules;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Identifies a stage; the names are the ones accepted in rules files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    /// Candidate validation
    Validate,
    /// Trailing-marker detection
    TrailingMarker,
    /// File and script reference filtering
    Reference,
    /// Control-code heuristics
    ControlCode,
}

impl StageKind {
    /// All stages in execution order
    pub const ALL: [StageKind; 4] = [
        StageKind::Validate,
        StageKind::TrailingMarker,
        StageKind::Reference,
        StageKind::ControlCode,
    ];

    /// Name used in rules files and reports
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Validate => "validate",
            StageKind::TrailingMarker => "trailing-marker",
            StageKind::Reference => "reference",
            StageKind::ControlCode => "control-code",
        }
    }

    /// Pass in which the stage runs
    pub fn pass(&self) -> Pass {
        match self {
            StageKind::ControlCode => Pass::Second,
            _ => Pass::First,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownStage(s.to_string()))
    }
}

/// Scan pass a stage belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Per candidate, in file order
    First,
    /// Over the surviving list
    Second,
}

/// Outcome of applying a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep the candidate
    Keep,
    /// Drop the candidate, with a short reason for diagnostics
    Reject(&'static str),
}

/// State threaded through one scan
#[derive(Debug, Clone)]
pub struct ScanState {
    /// Characters currently treated as trailing control characters
    pub known_controls: HashSet<char>,
    /// Characters added to `known_controls` during this scan, in order
    pub learned: Vec<char>,
}

impl ScanState {
    /// Fresh state seeded with the unusual characters of `rules`
    pub fn new(rules: &Rules) -> Self {
        Self {
            known_controls: rules
                .unusual
                .iter()
                .filter(|c| !rules.excluded.contains(c))
                .copied()
                .collect(),
            learned: Vec::new(),
        }
    }

    fn learn(&mut self, ch: char, rules: &Rules) {
        if ch.is_ascii_alphanumeric() || ch.is_whitespace() || rules.excluded.contains(&ch) {
            return;
        }
        if self.known_controls.insert(ch) {
            self.learned.push(ch);
        }
    }
}

/// A run under evaluation: visible characters plus any peeled marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Visible characters
    pub chars: Vec<char>,
    /// Offset of each visible character
    pub positions: Vec<usize>,
    /// Peeled trailing marker characters, in file order
    pub trailing: Vec<char>,
    /// Offset of each marker character
    pub trailing_positions: Vec<usize>,
}

impl From<RawRun> for Candidate {
    fn from(run: RawRun) -> Self {
        Self {
            chars: run.chars,
            positions: run.positions,
            trailing: Vec::new(),
            trailing_positions: Vec::new(),
        }
    }
}

impl Candidate {
    /// Visible text
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Peeled marker text
    pub fn trailing_text(&self) -> String {
        self.trailing.iter().collect()
    }

    /// Number of visible characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if nothing visible is left
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn trim(&mut self) {
        let leading = self.chars.iter().take_while(|c| c.is_whitespace()).count();
        self.chars.drain(..leading);
        self.positions.drain(..leading);
        self.trim_end();
    }

    fn trim_end(&mut self) {
        while self.chars.last().is_some_and(|c| c.is_whitespace()) {
            self.chars.pop();
            self.positions.pop();
        }
    }

    /// Number of visible characters before any trailing whitespace
    fn visible_len(&self) -> usize {
        let spaces = self.chars.iter().rev().take_while(|c| c.is_whitespace()).count();
        self.chars.len() - spaces
    }

    /// Moves the last `count` non-whitespace-trailed characters to the front
    /// of the marker, together with the whitespace that separated them from it
    fn peel(&mut self, count: usize) -> Vec<char> {
        let at = self.visible_len() - count;
        let chars = self.chars.split_off(at);
        let positions = self.positions.split_off(at);
        let peeled = chars[..count].to_vec();

        self.trailing.splice(0..0, chars);
        self.trailing_positions.splice(0..0, positions);
        peeled
    }
}

/// A named, independently testable heuristic
pub trait Stage: Send + Sync {
    /// Which stage this is
    fn kind(&self) -> StageKind;

    /// Evaluates `candidate`, possibly modifying it
    fn apply(&self, candidate: &mut Candidate, rules: &Rules, state: &mut ScanState) -> Verdict;
}

/// Rejects runs that cannot be dialog text
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn kind(&self) -> StageKind {
        StageKind::Validate
    }

    fn apply(&self, candidate: &mut Candidate, rules: &Rules, _state: &mut ScanState) -> Verdict {
        let config = &rules.config;
        candidate.trim();

        if candidate.len() < config.min_text_len {
            return Verdict::Reject("too short");
        }
        if candidate
            .chars
            .iter()
            .any(|&c| c == char::REPLACEMENT_CHARACTER || c == crate::codepage::PLACEHOLDER)
        {
            return Verdict::Reject("undecodable byte");
        }

        let profile = CharProfile::of(&candidate.chars, &rules.unusual);
        if !profile.has_letters() {
            return Verdict::Reject("no letters");
        }
        if profile.total <= config.short_run_len
            && CharProfile::ratio(profile.unusual, profile.total) > config.short_unusual_ratio
        {
            return Verdict::Reject("short run of unusual characters");
        }
        if profile.total < config.ratio_check_len {
            if profile.is_latin_dominant() {
                if CharProfile::ratio(profile.latin, profile.non_space) < config.min_latin_ratio {
                    return Verdict::Reject("too few Latin letters");
                }
            } else if CharProfile::ratio(profile.primary, profile.non_space)
                < config.min_primary_ratio
            {
                return Verdict::Reject("too few primary letters");
            }
        }
        Verdict::Keep
    }
}

/// Peels trailing control markers off the visible text
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingMarkerStage;

impl TrailingMarkerStage {
    /// Applies the first matching rule once; returns the peeled characters
    fn peel_once(candidate: &mut Candidate, rules: &Rules, state: &ScanState) -> Option<Vec<char>> {
        let len = candidate.visible_len();
        let chars = &candidate.chars[..len];
        let &last = chars.last()?;

        // Last word opened by a control glyph: "†D1430", "{D-ITEM}", "Џ[102,45,887]".
        if let Some(space) = chars.iter().rposition(|c| c.is_whitespace()) {
            if let Some((&first, rest)) = chars[space + 1..].split_first() {
                if state.known_controls.contains(&first)
                    && !rules.excluded.contains(&first)
                    && !rest.iter().any(|&c| is_primary(c))
                {
                    let count = rest.len() + 1;
                    candidate.peel(count);
                    return Some(vec![first]);
                }
            }
        }

        // Digit run glued to a non-space character: "‡ЋЌЏ0041", "ъ3".
        let digits = chars.iter().rev().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 && digits < len && !chars[len - digits - 1].is_whitespace() {
            // A lone glyph in front of the digits is part of the code.
            let lone = len - digits == 1 || chars[len - digits - 2].is_whitespace();
            let count = if lone { digits + 1 } else { digits };
            return Some(candidate.peel(count));
        }

        // Short non-alphabetic tail right after punctuation: "turnir.Ђ".
        if let Some(p) = chars.iter().rposition(|&c| is_marker_punctuation(c)) {
            let tail = &chars[p + 1..];
            let tail_len = tail.len();
            if tail_len > 0
                && tail_len <= rules.config.max_marker_tail
                && tail.iter().all(|&c| is_tail_char(c, rules))
            {
                return Some(candidate.peel(tail_len));
            }
        }

        if state.known_controls.contains(&last) && !rules.excluded.contains(&last) {
            return Some(candidate.peel(1));
        }

        // Unbalanced quote after the end of a sentence, with or without a space.
        let isolated_quote = is_quote(last)
            && chars[..len - 1]
                .iter()
                .rev()
                .find(|c| !c.is_whitespace())
                .is_some_and(|&c| is_sentence_end(c))
            && quote_is_unbalanced(chars, last);
        if isolated_quote {
            return Some(candidate.peel(1));
        }

        None
    }
}

impl Stage for TrailingMarkerStage {
    fn kind(&self) -> StageKind {
        StageKind::TrailingMarker
    }

    fn apply(&self, candidate: &mut Candidate, rules: &Rules, state: &mut ScanState) -> Verdict {
        candidate.trim_end();
        let limit = candidate.len();
        for _ in 0..limit {
            let Some(peeled) = Self::peel_once(candidate, rules, state) else {
                break;
            };
            for ch in peeled {
                state.learn(ch, rules);
            }
        }
        candidate.trim_end();

        if candidate.len() < rules.config.min_text_len {
            return Verdict::Reject("nothing left after markers");
        }
        if !candidate.chars.iter().any(|&c| is_primary(c) || is_latin(c)) {
            return Verdict::Reject("marker only");
        }
        Verdict::Keep
    }
}

fn is_tail_char(ch: char, rules: &Rules) -> bool {
    !is_primary(ch)
        && !ch.is_ascii_alphanumeric()
        && !ch.is_whitespace()
        && !is_quote(ch)
        && !rules.excluded.contains(&ch)
}

fn quote_is_unbalanced(chars: &[char], quote: char) -> bool {
    let count = |q: char| chars.iter().filter(|&&c| c == q).count();
    match quote {
        '"' | '\'' => count(quote) % 2 == 1,
        '»' => count('«') < count('»'),
        '”' => count('“') + count('„') < count('”'),
        _ => true,
    }
}

/// Rejects file names and script or path references
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceStage;

impl Stage for ReferenceStage {
    fn kind(&self) -> StageKind {
        StageKind::Reference
    }

    fn apply(&self, candidate: &mut Candidate, rules: &Rules, _state: &mut ScanState) -> Verdict {
        if candidate.chars.iter().any(|c| c.is_whitespace()) {
            return Verdict::Keep;
        }
        let text = candidate.text();

        if rules.has_reference_extension(&text) {
            return Verdict::Reject("file name");
        }
        if text.contains('/') || text.contains('\\') {
            return Verdict::Reject("path");
        }
        if (text.contains('_') || is_camel_case(&candidate.chars)) && has_dot_extension(&text) {
            return Verdict::Reject("script reference");
        }
        Verdict::Keep
    }
}

fn is_camel_case(chars: &[char]) -> bool {
    chars
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase())
}

fn has_dot_extension(text: &str) -> bool {
    match text.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && (1..=4).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Rejects text that decodes cleanly but reads as a control code
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlCodeStage;

impl Stage for ControlCodeStage {
    fn kind(&self) -> StageKind {
        StageKind::ControlCode
    }

    fn apply(&self, candidate: &mut Candidate, rules: &Rules, _state: &mut ScanState) -> Verdict {
        let config = &rules.config;
        let chars = without_structure_prefix(&candidate.chars);
        if chars.is_empty() {
            return Verdict::Reject("structure marker only");
        }
        let profile = CharProfile::of(chars, &rules.unusual);

        if profile.total <= config.short_control_len && profile.unusual > 0 {
            return Verdict::Reject("short with unusual characters");
        }
        if profile.is_latin_dominant() && profile.unusual > 0 {
            return Verdict::Reject("Latin with unusual characters");
        }
        if profile.total <= config.comma_check_len && has_comma_without_space(chars) {
            return Verdict::Reject("comma without space");
        }
        if rules.is_noise(&chars.iter().collect::<String>()) {
            return Verdict::Reject("noise pattern");
        }
        if profile.is_latin_dominant() {
            return Verdict::Keep;
        }
        if profile.total < config.punctuation_check_len
            && CharProfile::ratio(profile.punctuation, profile.non_space)
                > config.max_punctuation_ratio
        {
            return Verdict::Reject("punctuation density");
        }
        if profile.total >= config.no_space_min_len
            && profile.spaces == 0
            && !chars.iter().any(|&c| is_sentence_end(c))
        {
            return Verdict::Reject("no space or sentence punctuation");
        }
        Verdict::Keep
    }
}

fn has_comma_without_space(chars: &[char]) -> bool {
    chars
        .windows(2)
        .any(|w| w[0] == ',' && !w[1].is_whitespace())
}

/// An ordered list of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.kind()))
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    /// All four stages, two passes
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(ValidateStage),
                Box::new(TrailingMarkerStage),
                Box::new(ReferenceStage),
                Box::new(ControlCodeStage),
            ],
        }
    }

    /// Validation and marker peeling only, for the fallback scan
    pub fn single_pass() -> Self {
        Self {
            stages: vec![Box::new(ValidateStage), Box::new(TrailingMarkerStage)],
        }
    }

    /// Appends a custom stage
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stage kinds in execution order
    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Stages of `pass` that `rules` leaves enabled
    pub(crate) fn enabled<'a>(
        &'a self,
        pass: Pass,
        rules: &'a Rules,
    ) -> impl Iterator<Item = &'a dyn Stage> + 'a {
        self.stages
            .iter()
            .map(|s| s.as_ref())
            .filter(move |s| s.kind().pass() == pass && rules.is_enabled(s.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, start: usize) -> Candidate {
        let chars: Vec<char> = text.chars().collect();
        let positions = (start..start + chars.len()).collect();
        Candidate {
            chars,
            positions,
            trailing: Vec::new(),
            trailing_positions: Vec::new(),
        }
    }

    fn run(stage: &dyn Stage, text: &str) -> (Verdict, Candidate, ScanState) {
        let rules = Rules::builtin();
        let mut state = ScanState::new(&rules);
        let mut c = candidate(text, 0);
        let verdict = stage.apply(&mut c, &rules, &mut state);
        (verdict, c, state)
    }

    #[test]
    fn test_stage_names_round_trip() {
        for kind in StageKind::ALL {
            assert_eq!(kind.name().parse::<StageKind>().unwrap(), kind);
        }
        assert!("nope".parse::<StageKind>().is_err());
    }

    #[test]
    fn test_validate_trims_and_keeps_cyrillic() {
        let (verdict, c, _) = run(&ValidateStage, "  Привет, путник!  ");
        assert_eq!(verdict, Verdict::Keep);
        assert_eq!(c.text(), "Привет, путник!");
        assert_eq!(c.positions.first(), Some(&2));
    }

    #[test]
    fn test_validate_rejections() {
        assert!(matches!(run(&ValidateStage, "a").0, Verdict::Reject(_)));
        assert!(matches!(run(&ValidateStage, "да\u{2400}").0, Verdict::Reject(_)));
        assert!(matches!(run(&ValidateStage, "12345").0, Verdict::Reject(_)));
        assert!(matches!(run(&ValidateStage, "Џ‡a").0, Verdict::Reject(_)));
        // Five characters, only two Cyrillic letters among them.
        assert!(matches!(run(&ValidateStage, "ю%#&я").0, Verdict::Reject(_)));
        assert_eq!(run(&ValidateStage, "Hello").0, Verdict::Keep);
    }

    #[test]
    fn test_trailing_digits_after_glyphs() {
        let (verdict, c, _) = run(&TrailingMarkerStage, "Здравствуй, друг ‡ЋЌЏ0041");
        assert_eq!(verdict, Verdict::Keep);
        assert_eq!(c.text(), "Здравствуй, друг");
        assert_eq!(c.trailing_text(), "‡ЋЌЏ0041");
        assert_eq!(c.trailing_positions, (17..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_spaced_number_is_text() {
        let (_, c, _) = run(&TrailingMarkerStage, "Глава 2");
        assert_eq!(c.text(), "Глава 2");
        assert!(c.trailing.is_empty());
    }

    #[test]
    fn test_punctuation_tail_is_peeled_and_learned() {
        let (verdict, c, state) = run(&TrailingMarkerStage, "Он выиграл turnir.#");
        assert_eq!(verdict, Verdict::Keep);
        assert_eq!(c.text(), "Он выиграл turnir.");
        assert_eq!(c.trailing_text(), "#");
        assert_eq!(state.learned, vec!['#']);
    }

    #[test]
    fn test_known_control_is_peeled() {
        let (_, c, _) = run(&TrailingMarkerStage, "Иди сюда Џ");
        assert_eq!(c.text(), "Иди сюда");
        assert_eq!(c.trailing_text(), "Џ");
    }

    #[test]
    fn test_isolated_quote_after_sentence() {
        let (_, c, _) = run(&TrailingMarkerStage, "Конец истории. \"");
        assert_eq!(c.text(), "Конец истории.");
        assert_eq!(c.trailing_text(), "\"");

        let (_, c, _) = run(&TrailingMarkerStage, "Он сказал \"Стой.\"");
        assert_eq!(c.text(), "Он сказал \"Стой.\"");
        assert!(c.trailing.is_empty());
    }

    #[test]
    fn test_control_word_is_peeled_whole() {
        let cases = [
            ("Здравствуй, путник †D1430", "Здравствуй, путник", "†D1430"),
            ("Иди сюда {D-ITEM}", "Иди сюда", "{D-ITEM}"),
            ("Прощай Џ[102,45,887]", "Прощай", "Џ[102,45,887]"),
            ("Response 1 {D-ITEM}", "Response 1", "{D-ITEM}"),
            ("> Choice 1 їїїHERB03>=2", "> Choice 1", "їїїHERB03>=2"),
        ];
        for (line, text, marker) in cases {
            let (verdict, c, _) = run(&TrailingMarkerStage, line);
            assert_eq!(verdict, Verdict::Keep, "{}", line);
            assert_eq!((c.text(), c.trailing_text()), (text.to_string(), marker.to_string()));
        }
    }

    #[test]
    fn test_consecutive_control_words() {
        let (_, c, state) = run(&TrailingMarkerStage, "First line ‡ЋЌЏ0041 ¬?QR5=1");
        assert_eq!(c.text(), "First line");
        assert_eq!(c.trailing_text(), "‡ЋЌЏ0041 ¬?QR5=1");
        assert_eq!(c.trailing_positions, (11..27).collect::<Vec<_>>());
        // Latin letters inside a code are never learned.
        assert!(state.learned.is_empty());
    }

    #[test]
    fn test_lone_glyph_before_digits() {
        let (_, c, state) = run(&TrailingMarkerStage, "> Choice 2 ъ3");
        assert_eq!(c.text(), "> Choice 2");
        assert_eq!(c.trailing_text(), "ъ3");
        assert_eq!(state.learned, vec!['ъ']);

        let (_, c, _) = run(&TrailingMarkerStage, "Слово с кодом abc12");
        assert_eq!(c.text(), "Слово с кодом abc");
        assert_eq!(c.trailing_text(), "12");
    }

    #[test]
    fn test_cyrillic_word_after_glyph_is_text() {
        let (_, c, _) = run(&TrailingMarkerStage, "Он сказал <привет>");
        assert_eq!(c.text(), "Он сказал <привет");
        assert_eq!(c.trailing_text(), ">");
    }

    #[test]
    fn test_marker_only_rejected() {
        let (verdict, _, _) = run(&TrailingMarkerStage, "Џ0041");
        assert!(matches!(verdict, Verdict::Reject(_)));
    }

    #[test]
    fn test_reference_stage() {
        assert!(matches!(run(&ReferenceStage, "CONFIG.ini").0, Verdict::Reject(_)));
        assert!(matches!(run(&ReferenceStage, "scripts/intro").0, Verdict::Reject(_)));
        assert!(matches!(run(&ReferenceStage, "playerIntro.sc").0, Verdict::Reject(_)));
        assert!(matches!(run(&ReferenceStage, "npc_talk.q").0, Verdict::Reject(_)));
        assert_eq!(run(&ReferenceStage, "Иди.").0, Verdict::Keep);
        assert_eq!(run(&ReferenceStage, "see file.txt now").0, Verdict::Keep);
    }

    #[test]
    fn test_control_code_stage() {
        assert!(matches!(run(&ControlCodeStage, "ab{c").0, Verdict::Reject(_)));
        assert!(matches!(run(&ControlCodeStage, "Hello there~").0, Verdict::Reject(_)));
        assert!(matches!(run(&ControlCodeStage, "да,нет").0, Verdict::Reject(_)));
        assert!(matches!(run(&ControlCodeStage, "HERB03>=2").0, Verdict::Reject(_)));
        assert!(matches!(run(&ControlCodeStage, "ы!?;:ю").0, Verdict::Reject(_)));
        assert!(matches!(run(&ControlCodeStage, "ПРОВЕРКАСОСТОЯНИЯ").0, Verdict::Reject(_)));
        assert_eq!(run(&ControlCodeStage, "Да, конечно.").0, Verdict::Keep);
        assert_eq!(run(&ControlCodeStage, "Hello, traveller").0, Verdict::Keep);
        assert_eq!(run(&ControlCodeStage, "> Choice 1").0, Verdict::Keep);
        assert_eq!(run(&ControlCodeStage, "|Second line").0, Verdict::Keep);
        assert!(matches!(run(&ControlCodeStage, "> ").0, Verdict::Reject(_)));
    }

    #[test]
    fn test_pipeline_passes() {
        let rules = Rules::builtin();
        let pipeline = Pipeline::standard();
        let first: Vec<_> = pipeline.enabled(Pass::First, &rules).map(|s| s.kind()).collect();
        let second: Vec<_> = pipeline.enabled(Pass::Second, &rules).map(|s| s.kind()).collect();
        assert_eq!(
            first,
            vec![StageKind::Validate, StageKind::TrailingMarker, StageKind::Reference]
        );
        assert_eq!(second, vec![StageKind::ControlCode]);
        assert_eq!(Pipeline::single_pass().kinds().len(), 2);
    }
}
