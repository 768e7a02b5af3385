//! # glagol-core
//!
//! A library for extracting and rewriting the dialog text embedded in binary
//! `.dlg` game files.
//!
//! This crate provides the core functionality for:
//! - Locating runs of human-readable Windows-1251 text among control bytes
//! - Separating real dialog from text-looking control codes
//! - Writing edited text back in place without moving a single byte
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`codepage`]: Single-byte decoding with undecodable-byte detection
//! - [`scanner`]: Raw scanning and the heuristic stage pipeline
//! - [`rules`]: Data-driven heuristic configuration
//! - [`section`]: Text sections and protected bytes
//! - [`dialog`]: Branch and choice structure of the extracted lines
//! - [`writer`]: In-place write-back
//! - [`diff`]: Byte-by-byte comparison
//! - [`analysis`]: Byte statistics and phrase lookup
//! - [`session`]: Load, edit and save one file
//! - [`translate`]: Byte-budgeted translation driver
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use glagol_core::DialogFile;
//! use std::path::Path;
//!
//! let file = DialogFile::open("dialogs/intro.dlg")?;
//! for section in file.sections() {
//!     println!("{:#06x} {:>3} {}", section.start, section.capacity(), section.text);
//! }
//!
//! let edited = file.editable_text().replace("Привет", "Здравствуй");
//! file.write_backup()?;
//! file.save_with_updated_text(&edited, Some(Path::new("dialogs/intro.new.dlg")))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! The library provides several traits for customization:
//!
//! - [`ScanStrategy`]: Replace the whole scanning algorithm
//! - [`Stage`]: Add a heuristic to the pipeline
//! - [`Translator`]: Plug in a translation backend
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod analysis;
pub mod codepage;
pub mod dialog;
pub mod diff;
pub mod error;
pub mod rules;
pub mod scanner;
pub mod section;
pub mod session;
pub mod translate;
pub mod writer;

// Re-export primary types for convenience
pub use codepage::{CodePage, PLACEHOLDER};
pub use dialog::{DialogConfig, DialogTree};
pub use error::{Error, Result};
pub use rules::{HeuristicConfig, Rules};
pub use scanner::{
    scan_file, scan_file_with_config, Extraction, Pipeline, ScanReport, ScanStrategy, Scanner,
    ScannerConfig, Stage, StageKind,
};
pub use section::{ProtectedBytes, TextSection};
pub use session::DialogFile;
pub use translate::{translate_within_budget, TranslationRequest, Translator};
pub use writer::{ReconcilePolicy, WriteOutcome, WriteWarning, Writer, WriterConfig};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
