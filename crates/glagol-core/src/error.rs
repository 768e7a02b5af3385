//! Error types for the glagol-core library.
//!
//! Only conditions that abort an operation are represented here. Heuristic
//! rejections, encoding substitutions and truncations are reported through
//! [`ScanReport`](crate::scanner::ScanReport) and
//! [`WriteWarning`](crate::writer::WriteWarning) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for glagol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all glagol operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Edited strings could not be aligned with the extracted sections
    #[error("section count mismatch: expected {expected} edited strings, got {actual}")]
    SectionCountMismatch {
        /// Number of sections extracted from the original file
        expected: usize,
        /// Number of edited strings supplied
        actual: usize,
    },

    /// Failed to read a heuristic rules file
    #[error("failed to read rules file '{path}': {source}")]
    ConfigRead {
        /// Path to the rules file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Rules file is not valid TOML or has the wrong shape
    #[error("invalid rules file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A noise pattern in the rules could not be compiled
    #[error("invalid noise pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern source
        pattern: String,
        /// Regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Configured encoding is unknown or not a single-byte code page
    #[error("unsupported encoding '{0}': a single-byte code page is required")]
    UnsupportedEncoding(String),

    /// A disabled stage name does not match any known stage
    #[error("unknown heuristic stage '{0}'")]
    UnknownStage(String),

    /// Translator collaborator gave up
    #[error("translation failed: {0}")]
    Translation(String),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new rules file read error
    pub fn config_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new translation error
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the caller can degrade instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Translation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SectionCountMismatch {
            expected: 4,
            actual: 6,
        };
        assert!(err.to_string().contains("expected 4"));
        assert!(err.to_string().contains("got 6"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::internal("overlap").is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!Error::file_read("/missing.dlg", io).is_recoverable());
    }
}
