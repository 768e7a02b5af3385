//! Write-back of edited section texts into a copy of the original buffer.
//!
//! The writer never shifts bytes. Each changed section is rewritten inside its
//! writable span (visible text plus claimed padding), the encoded text is
//! truncated to fit, and the rest of the span is zero-filled. Trailing markers,
//! protected offsets and every byte outside a changed span keep their values.

use crate::codepage::CodePage;
use crate::error::{Error, Result};
use crate::section::{ProtectedBytes, TextSection};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, warn};

/// What to do when the edited strings do not line up 1:1 with the sections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Merge extra strings into the last one, pad missing ones with originals
    #[default]
    BestEffort,
    /// Refuse to write
    Strict,
}

/// Configuration for the writer
#[derive(Debug, Clone, Default)]
pub struct WriterConfig {
    /// Count mismatch handling
    pub policy: ReconcilePolicy,
}

impl WriterConfig {
    /// Creates a new writer config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reconciliation policy
    pub fn policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for [`ReconcilePolicy::Strict`]
    pub fn strict(self) -> Self {
        self.policy(ReconcilePolicy::Strict)
    }
}

/// Non-fatal condition reported by a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteWarning {
    /// The number of edited strings differed from the section count
    CountReconciled {
        /// Section count
        expected: usize,
        /// Strings supplied
        actual: usize,
    },
    /// Characters missing from the code page were replaced with `?`
    EncodingSubstituted {
        /// Section index
        section: usize,
        /// Number of replaced characters
        count: usize,
    },
    /// The encoded text was cut to the section capacity
    Truncated {
        /// Section index
        section: usize,
        /// Encoded length before truncation
        needed: usize,
        /// Bytes available
        capacity: usize,
    },
    /// The section could not be located and was left untouched
    SectionSkipped {
        /// Section index
        section: usize,
        /// Why it was skipped
        reason: String,
    },
}

impl fmt::Display for WriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteWarning::CountReconciled { expected, actual } => write!(
                f,
                "expected {} edited strings, got {}; counts were reconciled",
                expected, actual
            ),
            WriteWarning::EncodingSubstituted { section, count } => write!(
                f,
                "section {}: {} character(s) not in the code page were replaced with '?'",
                section + 1,
                count
            ),
            WriteWarning::Truncated {
                section,
                needed,
                capacity,
            } => write!(
                f,
                "section {}: text needs {} bytes but only {} fit, truncated",
                section + 1,
                needed,
                capacity
            ),
            WriteWarning::SectionSkipped { section, reason } => {
                write!(f, "section {}: left unmodified ({})", section + 1, reason)
            }
        }
    }
}

/// Result of a write
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The new buffer, same length as the original
    pub buffer: Vec<u8>,
    /// Warnings in section order, reconciliation first
    pub warnings: Vec<WriteWarning>,
    /// Indices of the sections that were rewritten
    pub changed_sections: Vec<usize>,
    /// Offsets inside the writable spans of rewritten sections
    pub changed_positions: BTreeSet<usize>,
}

impl WriteOutcome {
    /// Returns true if no section was rewritten
    pub fn is_unchanged(&self) -> bool {
        self.changed_sections.is_empty()
    }
}

/// Aligns `edited` with `sections`
///
/// Extra strings are merged into the last one with a space; missing ones are
/// filled with the section's current text.
pub fn reconcile(
    sections: &[TextSection],
    edited: &[String],
    policy: ReconcilePolicy,
) -> Result<(Vec<String>, Option<WriteWarning>)> {
    let expected = sections.len();
    let actual = edited.len();
    if expected == actual {
        return Ok((edited.to_vec(), None));
    }
    if policy == ReconcilePolicy::Strict {
        return Err(Error::SectionCountMismatch { expected, actual });
    }

    warn!(
        "Edited text has {} lines for {} sections, reconciling",
        actual, expected
    );
    let mut aligned: Vec<String> = edited.iter().take(expected).cloned().collect();
    if actual > expected {
        if let Some(last) = aligned.last_mut() {
            for extra in &edited[expected..] {
                last.push(' ');
                last.push_str(extra);
            }
        }
    } else {
        aligned.extend(sections[actual..].iter().map(|s| s.text.clone()));
    }
    Ok((aligned, Some(WriteWarning::CountReconciled { expected, actual })))
}

/// Binary text writer
#[derive(Debug, Clone, Default)]
pub struct Writer {
    config: WriterConfig,
    codepage: CodePage,
}

impl Writer {
    /// Creates a writer for Windows-1251 with the best-effort policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with custom configuration
    pub fn with_config(config: WriterConfig) -> Self {
        Self {
            config,
            codepage: CodePage::default(),
        }
    }

    /// Sets the code page used to encode new text
    pub fn with_codepage(mut self, codepage: CodePage) -> Self {
        self.codepage = codepage;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Writes `edited` into a copy of `original`
    ///
    /// Fails only on a count mismatch under [`ReconcilePolicy::Strict`].
    pub fn write(
        &self,
        original: &[u8],
        sections: &[TextSection],
        protected: &ProtectedBytes,
        edited: &[String],
    ) -> Result<WriteOutcome> {
        let (aligned, reconciled) = reconcile(sections, edited, self.config.policy)?;
        let mut outcome = WriteOutcome {
            buffer: original.to_vec(),
            warnings: reconciled.into_iter().collect(),
            changed_sections: Vec::new(),
            changed_positions: BTreeSet::new(),
        };

        let changed: Vec<usize> = sections
            .iter()
            .zip(&aligned)
            .enumerate()
            .filter(|(_, (section, text))| section.text != **text)
            .map(|(index, _)| index)
            .collect();
        if changed.is_empty() {
            debug!("No section changed, output is a copy of the original");
            return Ok(outcome);
        }

        for index in changed {
            let section = &sections[index];
            let Some(codepage) = self.codepage_for(section) else {
                let warning = WriteWarning::SectionSkipped {
                    section: index,
                    reason: format!("{} is not a single-byte encoding", section.encoding.name()),
                };
                warn!("{}", warning);
                outcome.warnings.push(warning);
                continue;
            };
            let Some(span) = Self::locate(&codepage, original, section) else {
                let warning = WriteWarning::SectionSkipped {
                    section: index,
                    reason: format!("text not found in {}..{}", section.start, section.end),
                };
                warn!("{}", warning);
                outcome.warnings.push(warning);
                continue;
            };
            let slots: Vec<usize> = span
                .into_iter()
                .filter(|&p| !protected.contains(p))
                .collect();
            Self::write_section(&codepage, &mut outcome, index, &aligned[index], &slots);
        }

        debug!(
            "Rewrote {} of {} sections, {} warnings",
            outcome.changed_sections.len(),
            sections.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Code page matching the encoding `section` was decoded with
    fn codepage_for(&self, section: &TextSection) -> Option<Cow<'_, CodePage>> {
        if section.encoding == self.codepage.encoding() {
            return Some(Cow::Borrowed(&self.codepage));
        }
        if !section.encoding.is_single_byte() {
            return None;
        }
        debug!(
            "Section at {} uses {}, not {}",
            section.start,
            section.encoding.name(),
            self.codepage.name()
        );
        Some(Cow::Owned(CodePage::for_encoding(section.encoding)))
    }

    /// Finds the writable offsets of `section` in `original`
    fn locate(codepage: &CodePage, original: &[u8], section: &TextSection) -> Option<Vec<usize>> {
        let in_bounds = |p: &usize| *p < original.len();
        if !section.text_byte_positions.is_empty()
            && section.text_byte_positions.iter().all(in_bounds)
        {
            return Some(section.writable_positions().filter(in_bounds).collect());
        }

        // Positions are unusable: look for the encoded text inside the range.
        let needle = codepage.encode_strict(&section.text)?;
        let end = section
            .trailing_control_positions
            .first()
            .copied()
            .unwrap_or(section.end)
            .min(original.len());
        let haystack = original.get(section.start..end)?;
        let found = find_subslice(haystack, &needle)?;
        Some((section.start + found..end).collect())
    }

    fn write_section(
        codepage: &CodePage,
        outcome: &mut WriteOutcome,
        index: usize,
        text: &str,
        slots: &[usize],
    ) {
        let encoded = codepage.encode(text);
        if encoded.had_substitutions() {
            let warning = WriteWarning::EncodingSubstituted {
                section: index,
                count: encoded.substituted,
            };
            warn!("{}", warning);
            outcome.warnings.push(warning);
        }

        let mut bytes = encoded.bytes;
        let capacity = slots.len();
        if bytes.len() > capacity {
            let needed = bytes.len();
            let mut cut = capacity;
            while cut > 0 && !codepage.is_decodable(bytes[cut - 1]) {
                cut -= 1;
            }
            bytes.truncate(cut);
            let warning = WriteWarning::Truncated {
                section: index,
                needed,
                capacity,
            };
            warn!("{}", warning);
            outcome.warnings.push(warning);
        }

        for (i, &slot) in slots.iter().enumerate() {
            outcome.buffer[slot] = bytes.get(i).copied().unwrap_or(0);
        }
        outcome.changed_sections.push(index);
        outcome.changed_positions.extend(slots.iter().copied());
    }
}

/// Offset of the first occurrence of `needle` in `haystack`
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
