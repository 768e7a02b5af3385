//! Dialog structure recovered from section texts.
//!
//! Dialog lines use two structural markers: `|` opens a new branch and a
//! leading `>` marks a player choice. Lines after a choice are its responses
//! until the next choice or branch. Control codes (`†D1430`, `{D-ITEM}`,
//! `Џ[102,45,887]`, ...) are split off each line, both from the peeled
//! trailing marker and from inside the text.
//!
//! The tree is a read-only view; editing still goes through the sections.

use crate::section::TextSection;
use std::fmt::{self, Write as FmtWrite};

/// Opens a new branch
pub const BRANCH_SEPARATOR: char = '|';

/// Marks a player choice at the start of a line
pub const CHOICE_MARKER: char = '>';

/// Prefixes that open a control code word
pub const DEFAULT_CODE_PREFIXES: &[&str] =
    &["‡ЋЌЏ", "їїї", "¬?", "{D-", "ъ", "†", "Џ", "\\"];

/// Configuration for dialog parsing and rendering
#[derive(Debug, Clone)]
pub struct DialogConfig {
    /// Word prefixes treated as control codes
    pub code_prefixes: Vec<String>,
    /// Indentation string (default: 2 spaces)
    pub indent_str: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            code_prefixes: DEFAULT_CODE_PREFIXES.iter().map(|s| s.to_string()).collect(),
            indent_str: "  ".to_string(),
        }
    }
}

impl DialogConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the control code prefixes
    pub fn code_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.code_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Returns true if `word` starts with a control code prefix
    pub fn is_code(&self, word: &str) -> bool {
        self.code_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && word.starts_with(prefix.as_str()))
    }

    /// Splits `text` into its plain words and its control codes
    pub fn extract_codes(&self, text: &str) -> (String, Vec<String>) {
        let mut words = Vec::new();
        let mut codes = Vec::new();
        for word in text.split_whitespace() {
            if self.is_code(word) {
                codes.push(word.to_string());
            } else {
                words.push(word);
            }
        }
        (words.join(" "), codes)
    }
}

/// One line of dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogLine {
    /// Index of the section the line came from
    pub section: usize,
    /// Text without structural markers or codes
    pub text: String,
    /// Control codes in file order
    pub codes: Vec<String>,
}

/// A player choice and the lines that answer it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// The choice itself
    pub prompt: DialogLine,
    /// Lines up to the next choice or branch
    pub responses: Vec<DialogLine>,
}

/// Lines between two branch separators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    /// Lines before the first choice
    pub lines: Vec<DialogLine>,
    /// Choices in file order
    pub choices: Vec<Choice>,
}

impl Branch {
    /// Returns true if the branch holds no line
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.choices.is_empty()
    }

    fn push(&mut self, line: DialogLine, is_choice: bool) {
        if is_choice {
            self.choices.push(Choice {
                prompt: line,
                responses: Vec::new(),
            });
        } else if let Some(choice) = self.choices.last_mut() {
            choice.responses.push(line);
        } else {
            self.lines.push(line);
        }
    }

    fn last_line_mut(&mut self) -> Option<&mut DialogLine> {
        match self.choices.last_mut() {
            Some(choice) => Some(choice.responses.last_mut().unwrap_or(&mut choice.prompt)),
            None => self.lines.last_mut(),
        }
    }

    fn all_lines(&self) -> impl Iterator<Item = &DialogLine> + '_ {
        self.lines.iter().chain(
            self.choices
                .iter()
                .flat_map(|c| std::iter::once(&c.prompt).chain(&c.responses)),
        )
    }
}

/// Branches recovered from a file's sections
#[derive(Debug, Clone)]
pub struct DialogTree {
    /// Branches in file order
    pub branches: Vec<Branch>,
    config: DialogConfig,
}

impl DialogTree {
    /// Builds the tree with the default configuration
    pub fn from_sections(sections: &[TextSection]) -> Self {
        Self::with_config(sections, DialogConfig::default())
    }

    /// Builds the tree from `sections` in file order
    pub fn with_config(sections: &[TextSection], config: DialogConfig) -> Self {
        let mut branches = Vec::new();
        let mut current = Branch::default();

        for (index, section) in sections.iter().enumerate() {
            for (n, part) in split_branches(&section.text).into_iter().enumerate() {
                if n > 0 && !current.is_empty() {
                    branches.push(std::mem::take(&mut current));
                }
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                let (body, is_choice) = match part.strip_prefix(CHOICE_MARKER) {
                    Some(prompt) => (prompt, true),
                    None => (part, false),
                };
                let (text, codes) = config.extract_codes(body);
                current.push(
                    DialogLine {
                        section: index,
                        text,
                        codes,
                    },
                    is_choice,
                );
            }

            let trailing: Vec<String> = section
                .trailing_control
                .split_whitespace()
                .map(str::to_string)
                .collect();
            if trailing.is_empty() {
                continue;
            }
            // Text ending in a separator leaves its codes with the closed branch.
            let line = if current.is_empty() {
                branches.last_mut().and_then(Branch::last_line_mut)
            } else {
                current.last_line_mut()
            };
            if let Some(line) = line {
                line.codes.extend(trailing);
            }
        }

        if !current.is_empty() {
            branches.push(current);
        }
        Self { branches, config }
    }

    /// Returns true if no dialog line was found
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Number of lines, choices included
    pub fn line_count(&self) -> usize {
        self.branches.iter().map(|b| b.all_lines().count()).sum()
    }

    /// Every control code in file order
    pub fn codes(&self) -> Vec<&str> {
        self.branches
            .iter()
            .flat_map(Branch::all_lines)
            .flat_map(|line| line.codes.iter().map(String::as_str))
            .collect()
    }

    /// Write the indented tree to a writer
    pub fn write_to(&self, w: &mut impl FmtWrite) -> fmt::Result {
        let mut writer = TreeWriter::new(w, &self.config);
        for (number, branch) in self.branches.iter().enumerate() {
            writer.write_branch(number + 1, branch)?;
        }
        Ok(())
    }
}

impl fmt::Display for DialogTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Splits `text` on branch separators outside `[]` and `{}`
pub fn split_branches(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut from = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            BRANCH_SEPARATOR if depth == 0 => {
                parts.push(&text[from..i]);
                from = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[from..]);
    parts
}

struct TreeWriter<'a, W: FmtWrite> {
    writer: &'a mut W,
    config: &'a DialogConfig,
    indent_level: usize,
}

impl<'a, W: FmtWrite> TreeWriter<'a, W> {
    fn new(writer: &'a mut W, config: &'a DialogConfig) -> Self {
        Self {
            writer,
            config,
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) -> fmt::Result {
        for _ in 0..self.indent_level {
            write!(self.writer, "{}", self.config.indent_str)?;
        }
        Ok(())
    }

    fn write_line(&mut self, marker: &str, line: &DialogLine) -> fmt::Result {
        self.write_indent()?;
        write!(self.writer, "{}#{}", marker, line.section + 1)?;
        if !line.text.is_empty() {
            write!(self.writer, " {}", line.text)?;
        }
        for code in &line.codes {
            write!(self.writer, " [{}]", code)?;
        }
        writeln!(self.writer)
    }

    fn write_branch(&mut self, number: usize, branch: &Branch) -> fmt::Result {
        writeln!(self.writer, "Branch {}", number)?;
        self.indent();
        for line in &branch.lines {
            self.write_line("", line)?;
        }
        for choice in &branch.choices {
            self.write_line("> ", &choice.prompt)?;
            self.indent();
            for response in &choice.responses {
                self.write_line("", response)?;
            }
            self.dedent();
        }
        self.dedent();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepage::CodePage;
    use crate::scanner::{ScanStrategy, Scanner};
    use pretty_assertions::assert_eq;

    fn scanned(lines: &[&str]) -> Vec<TextSection> {
        let data = CodePage::windows_1251()
            .encode_strict(&lines.join("\n"))
            .unwrap();
        Scanner::new().scan(&data).sections
    }

    fn marked_up() -> Vec<TextSection> {
        scanned(&[
            "First line ‡ЋЌЏ0041 ¬?QR5=1",
            "> Choice 1 їїїHERB03>=2",
            "Response 1 {D-ITEM}",
            "|Second line †D1430",
            "> Choice 2 ъ3",
            "Response 2 Џ[102,45,887]",
        ])
    }

    fn line(section: usize, text: &str, codes: &[&str]) -> DialogLine {
        DialogLine {
            section,
            text: text.to_string(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_branches_and_choices() {
        let tree = DialogTree::from_sections(&marked_up());
        assert_eq!(tree.branches.len(), 2);

        let first = &tree.branches[0];
        assert_eq!(first.lines, vec![line(0, "First line", &["‡ЋЌЏ0041", "¬?QR5=1"])]);
        assert_eq!(first.choices.len(), 1);
        assert_eq!(first.choices[0].prompt, line(1, "Choice 1", &["їїїHERB03>=2"]));
        assert_eq!(first.choices[0].responses, vec![line(2, "Response 1", &["{D-ITEM}"])]);

        let second = &tree.branches[1];
        assert_eq!(second.lines, vec![line(3, "Second line", &["†D1430"])]);
        assert_eq!(second.choices[0].prompt, line(4, "Choice 2", &["ъ3"]));
        assert_eq!(
            second.choices[0].responses,
            vec![line(5, "Response 2", &["Џ[102,45,887]"])]
        );
        assert_eq!(tree.line_count(), 6);
    }

    #[test]
    fn test_render_keeps_every_code() {
        let tree = DialogTree::from_sections(&marked_up());
        let rendered = tree.to_string();
        for code in [
            "‡ЋЌЏ0041",
            "¬?QR5=1",
            "їїїHERB03>=2",
            "{D-ITEM}",
            "†D1430",
            "ъ3",
            "Џ[102,45,887]",
        ] {
            assert!(rendered.contains(code), "{} missing from\n{}", code, rendered);
        }
        assert_eq!(tree.codes().len(), 7);
        assert!(rendered.starts_with("Branch 1\n  #1 First line [‡ЋЌЏ0041] [¬?QR5=1]\n  > #2 Choice 1"));
        assert!(rendered.contains("\n    #3 Response 1 [{D-ITEM}]\n"));
    }

    #[test]
    fn test_split_branches_outside_brackets() {
        assert_eq!(split_branches("a|b{x|y}[1|2]|c"), vec!["a", "b{x|y}[1|2]", "c"]);
        assert_eq!(split_branches("|a"), vec!["", "a"]);
        assert_eq!(split_branches("plain"), vec!["plain"]);
    }

    #[test]
    fn test_inline_codes() {
        let config = DialogConfig::new();
        let (text, codes) = config.extract_codes("Иди †D12 сюда");
        assert_eq!(text, "Иди сюда");
        assert_eq!(codes, vec!["†D12"]);

        let custom = DialogConfig::new().code_prefixes(["@"]);
        assert_eq!(custom.extract_codes("Иди @x †D12").1, vec!["@x"]);
    }

    #[test]
    fn test_separator_inside_one_section() {
        let sections = scanned(&["Да, конечно.|Нет, спасибо."]);
        let tree = DialogTree::from_sections(&sections);
        assert_eq!(tree.branches.len(), 2);
        assert_eq!(tree.branches[1].lines[0].text, "Нет, спасибо.");
        assert_eq!(tree.branches[1].lines[0].section, 0);
    }

    #[test]
    fn test_empty_tree() {
        let tree = DialogTree::from_sections(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "");
    }
}
