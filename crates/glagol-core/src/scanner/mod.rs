//! Binary scanning module for finding editable dialog text.
//!
//! This module turns an opaque `.dlg` buffer into an ordered list of
//! [`TextSection`]s.
//!
//! ## Algorithm Overview
//!
//! 1. Split the buffer on bytes below 0x20 and decode every other byte
//!    individually, remembering its offset ([`raw`])
//! 2. Run each candidate through the first-pass stages: validation,
//!    trailing-marker peeling and reference filtering ([`stages`])
//! 3. Run the surviving list through the control-code stage
//! 4. Claim trailing null/space padding as writable capacity ([`space`])
//! 5. Sort by start offset and verify the section invariants
//!
//! If the final verification fails, the scan is repeated with a single pass
//! (validation and marker peeling only) and any section that still collides
//! with an earlier one is dropped.
//!
//! ## Extensibility
//!
//! The [`ScanStrategy`] trait allows custom scanning algorithms, and
//! [`Pipeline::with_stage`] accepts additional [`Stage`]s.

mod classify;
mod raw;
mod space;
mod stages;

use crate::codepage::CodePage;
use crate::error::{Error, Result};
use crate::rules::{HeuristicConfig, Rules};
use crate::section::{sections_are_consistent, ProtectedBytes, TextSection};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, trace, warn};

pub use classify::{is_latin, is_primary, CharProfile};
pub use raw::{RawRun, FIRST_TEXT_BYTE};
pub use space::is_padding;
pub use stages::{
    Candidate, ControlCodeStage, Pass, Pipeline, ReferenceStage, ScanState, Stage, StageKind,
    TrailingMarkerStage, ValidateStage, Verdict,
};

/// Diagnostics gathered during one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Runs produced by the raw scan
    pub raw_runs: usize,
    /// Rejections per stage name
    pub rejected: BTreeMap<&'static str, usize>,
    /// Control characters learned during the scan, in discovery order
    pub learned_controls: Vec<char>,
    /// Number of undecodable byte offsets
    pub protected_bytes: usize,
    /// Sections in the final list
    pub sections: usize,
    /// True if the single-pass fallback produced the result
    pub used_fallback: bool,
}

impl ScanReport {
    fn reject(&mut self, stage: StageKind) {
        *self.rejected.entry(stage.name()).or_default() += 1;
    }

    /// Total rejected candidates
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Result of scanning one buffer
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Sections sorted by start offset
    pub sections: Vec<TextSection>,
    /// Offsets that must never be written
    pub protected: ProtectedBytes,
    /// Advisory diagnostics
    pub report: ScanReport,
}

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Heuristic thresholds, sets and noise tables
    pub rules: HeuristicConfig,
    /// Retry with the single-pass scan when verification fails
    pub fallback: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            rules: HeuristicConfig::default(),
            fallback: true,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the heuristic rules
    pub fn rules(mut self, rules: HeuristicConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Enables or disables the single-pass fallback
    pub fn fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }
}

/// Trait for implementing custom scanning strategies
///
/// Scanning never fails: ambiguous runs are excluded, not reported as errors.
pub trait ScanStrategy: Send + Sync {
    /// Scan the provided data for editable text
    fn scan(&self, data: &[u8]) -> Extraction;
}

/// Primary scanner for finding dialog text in `.dlg` buffers
#[derive(Debug)]
pub struct Scanner {
    codepage: CodePage,
    rules: Rules,
    pipeline: Pipeline,
    fallback: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a new scanner with the built-in rules
    pub fn new() -> Self {
        Self {
            codepage: CodePage::windows_1251(),
            rules: Rules::builtin(),
            pipeline: Pipeline::standard(),
            fallback: true,
        }
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Result<Self> {
        Ok(Self {
            codepage: config.rules.codepage()?,
            rules: config.rules.compile()?,
            pipeline: Pipeline::standard(),
            fallback: config.fallback,
        })
    }

    /// Replaces the stage pipeline
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The code page sections are decoded with
    pub fn codepage(&self) -> &CodePage {
        &self.codepage
    }

    /// The compiled heuristic rules
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Runs `pipeline` over `data` and assembles sorted sections
    fn run_pipeline(
        &self,
        data: &[u8],
        runs: Vec<RawRun>,
        pipeline: &Pipeline,
        report: &mut ScanReport,
    ) -> Vec<TextSection> {
        let mut state = ScanState::new(&self.rules);
        let mut candidates = Vec::with_capacity(runs.len());

        'runs: for run in runs {
            let start = run.start();
            let mut candidate = Candidate::from(run);
            for stage in pipeline.enabled(Pass::First, &self.rules) {
                if let Verdict::Reject(reason) = stage.apply(&mut candidate, &self.rules, &mut state) {
                    trace!("{} rejected run at {}: {}", stage.kind(), start, reason);
                    report.reject(stage.kind());
                    continue 'runs;
                }
            }
            candidates.push(candidate);
        }

        for stage in pipeline.enabled(Pass::Second, &self.rules) {
            candidates.retain_mut(|candidate| {
                match stage.apply(candidate, &self.rules, &mut state) {
                    Verdict::Keep => true,
                    Verdict::Reject(reason) => {
                        trace!(
                            "{} rejected {:?} at {}: {}",
                            stage.kind(),
                            candidate.text(),
                            candidate.positions.first().copied().unwrap_or_default(),
                            reason
                        );
                        report.reject(stage.kind());
                        false
                    }
                }
            });
        }

        for &ch in &state.learned {
            debug!("Learned control character {:?} (U+{:04X})", ch, ch as u32);
        }
        report.learned_controls = state.learned;

        let encoding = self.codepage.encoding();
        let mut sections: Vec<TextSection> = candidates
            .into_iter()
            .filter_map(|candidate| space::build_section(candidate, data, encoding))
            .collect();
        sections.sort_by_key(|s| s.start);
        sections
    }

    /// Primary scan: both passes, then invariant verification
    fn scan_two_pass(
        &self,
        data: &[u8],
        runs: Vec<RawRun>,
        report: &mut ScanReport,
    ) -> std::result::Result<Vec<TextSection>, (Error, Vec<TextSection>)> {
        let sections = self.run_pipeline(data, runs, &self.pipeline, report);
        if !sections_are_consistent(&sections) {
            return Err((
                Error::internal("extracted sections overlap or are malformed"),
                sections,
            ));
        }
        Ok(sections)
    }

    /// Fallback scan: validation and marker peeling only
    pub fn scan_single_pass(&self, data: &[u8]) -> Extraction {
        let (runs, protected) = raw::scan(data, &self.codepage);
        let mut report = ScanReport {
            raw_runs: runs.len(),
            protected_bytes: protected.len(),
            used_fallback: true,
            ..ScanReport::default()
        };
        let sections = self.single_pass_sections(data, runs, &mut report);
        report.sections = sections.len();
        Extraction {
            sections,
            protected,
            report,
        }
    }

    fn single_pass_sections(&self, data: &[u8], runs: Vec<RawRun>, report: &mut ScanReport) -> Vec<TextSection> {
        let sections = self.run_pipeline(data, runs, &Pipeline::single_pass(), report);
        drop_inconsistent(sections)
    }
}

/// Keeps consistent sections that do not collide with an earlier kept one
fn drop_inconsistent(sections: Vec<TextSection>) -> Vec<TextSection> {
    let mut kept: Vec<TextSection> = Vec::with_capacity(sections.len());
    let mut claimed = BTreeSet::new();
    let mut max_end = 0;
    for section in sections {
        let positions = section.claimed_positions();
        let collides =
            section.start < max_end && positions.iter().any(|p| claimed.contains(p));
        if section.is_consistent() && !collides {
            max_end = max_end.max(section.end);
            claimed.extend(positions);
            kept.push(section);
        } else {
            warn!("Dropping malformed section at {}..{}", section.start, section.end);
        }
    }
    kept
}

impl ScanStrategy for Scanner {
    fn scan(&self, data: &[u8]) -> Extraction {
        debug!("Starting scan of {} bytes", data.len());

        let (runs, protected) = raw::scan(data, &self.codepage);
        let mut report = ScanReport {
            raw_runs: runs.len(),
            protected_bytes: protected.len(),
            ..ScanReport::default()
        };

        let sections = match self.scan_two_pass(data, runs, &mut report) {
            Ok(sections) => sections,
            Err((e, _)) if self.fallback => {
                warn!("Primary scan failed ({}), falling back to single pass", e);
                report = ScanReport {
                    raw_runs: report.raw_runs,
                    protected_bytes: report.protected_bytes,
                    used_fallback: true,
                    ..ScanReport::default()
                };
                let (runs, _) = raw::scan(data, &self.codepage);
                self.single_pass_sections(data, runs, &mut report)
            }
            Err((e, sections)) => {
                warn!("Primary scan failed ({}), dropping malformed sections", e);
                drop_inconsistent(sections)
            }
        };

        report.sections = sections.len();
        debug!(
            "Scan complete: {} sections from {} runs, {} rejected, {} protected bytes",
            report.sections,
            report.raw_runs,
            report.total_rejected(),
            report.protected_bytes
        );

        Extraction {
            sections,
            protected,
            report,
        }
    }
}

/// Scan a file for editable dialog text
///
/// This is a convenience function that reads the file and scans it.
pub fn scan_file(path: impl AsRef<Path>) -> Result<Extraction> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(Scanner::new().scan(&data))
}

/// Scan a file with custom configuration
pub fn scan_file_with_config(path: impl AsRef<Path>, config: ScannerConfig) -> Result<Extraction> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Ok(Scanner::with_config(config)?.scan(&data))
}
