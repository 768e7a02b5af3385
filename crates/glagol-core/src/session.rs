//! Editing session over one `.dlg` file.
//!
//! A [`DialogFile`] holds the immutable original bytes and the sections found
//! in them. Edits never touch the session; every save builds a fresh buffer
//! from the original.

use crate::codepage::CodePage;
use crate::diff::{self, Comparison};
use crate::error::{Error, Result};
use crate::scanner::{Extraction, ScanReport, ScanStrategy, Scanner, ScannerConfig};
use crate::section::{ProtectedBytes, TextSection};
use crate::writer::{WriteOutcome, Writer, WriterConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Separator between section texts in the editable text
pub const SEPARATOR: char = '\n';

/// Extension appended for backups
pub const BACKUP_EXTENSION: &str = "bak";

/// A loaded dialog file
#[derive(Debug)]
pub struct DialogFile {
    path: PathBuf,
    original: Vec<u8>,
    extraction: Extraction,
    codepage: CodePage,
    writer: Writer,
}

/// Result of saving a session
#[derive(Debug)]
pub struct SaveOutcome {
    /// Where the buffer was written
    pub path: PathBuf,
    /// The write itself
    pub write: WriteOutcome,
    /// Differences outside the rewritten spans, for a distinct destination
    pub unexpected: Vec<diff::Difference>,
}

impl DialogFile {
    /// Loads and scans `path` with the default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ScannerConfig::default(), WriterConfig::default())
    }

    /// Loads and scans `path`
    pub fn open_with(
        path: impl AsRef<Path>,
        scanner: ScannerConfig,
        writer: WriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let original = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
        let scanner = Scanner::with_config(scanner)?;
        Ok(Self::from_bytes(path, original, &scanner, writer))
    }

    /// Builds a session from bytes already in memory
    pub fn from_bytes(
        path: impl Into<PathBuf>,
        original: Vec<u8>,
        scanner: &Scanner,
        writer: WriterConfig,
    ) -> Self {
        let path = path.into();
        let extraction = scanner.scan(&original);
        info!(
            "Loaded {} ({} bytes, {} sections)",
            path.display(),
            original.len(),
            extraction.sections.len()
        );
        let codepage = scanner.codepage().clone();
        Self {
            path,
            original,
            extraction,
            writer: Writer::with_config(writer).with_codepage(codepage.clone()),
            codepage,
        }
    }

    /// Path the session was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The original bytes
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Sections in file order
    pub fn sections(&self) -> &[TextSection] {
        &self.extraction.sections
    }

    /// Undecodable offsets
    pub fn protected(&self) -> &ProtectedBytes {
        &self.extraction.protected
    }

    /// Scan diagnostics
    pub fn report(&self) -> &ScanReport {
        &self.extraction.report
    }

    /// The code page in use
    pub fn codepage(&self) -> &CodePage {
        &self.codepage
    }

    /// All section texts joined with [`SEPARATOR`]
    pub fn editable_text(&self) -> String {
        let mut joined = String::new();
        for (index, section) in self.sections().iter().enumerate() {
            if index > 0 {
                joined.push(SEPARATOR);
            }
            joined.push_str(&section.text);
        }
        joined
    }

    /// Builds a new buffer from one string per section, without saving
    pub fn apply_texts(&self, edited: &[String]) -> Result<WriteOutcome> {
        self.writer
            .write(&self.original, self.sections(), self.protected(), edited)
    }

    /// Splits `joined` on [`SEPARATOR`] and writes the result
    ///
    /// Writes to `output`, or over the source when `None`. A distinct
    /// destination is compared against the original afterwards and any change
    /// outside the rewritten spans is logged and returned.
    pub fn save_with_updated_text(&self, joined: &str, output: Option<&Path>) -> Result<SaveOutcome> {
        let edited: Vec<String> = split_editable(joined);
        let write = self.apply_texts(&edited)?;

        let destination = output.unwrap_or(&self.path);
        std::fs::write(destination, &write.buffer).map_err(|e| Error::file_write(destination, e))?;
        info!("Wrote {}", destination.display());

        let mut unexpected = Vec::new();
        if destination != self.path.as_path() {
            let comparison = diff::compare(&self.original, &write.buffer, &self.codepage);
            if comparison.size_differs() {
                warn!(
                    "File sizes differ: original {}, new {}",
                    comparison.original_len, comparison.updated_len
                );
            }
            for difference in comparison.unexpected(&write.changed_positions) {
                warn!("Unexpected difference at {}", difference);
                unexpected.push(difference.clone());
            }
        }

        Ok(SaveOutcome {
            path: destination.to_path_buf(),
            write,
            unexpected,
        })
    }

    /// Copies the original bytes to `<path>.bak`
    pub fn write_backup(&self) -> Result<PathBuf> {
        let backup = backup_path(&self.path);
        std::fs::write(&backup, &self.original).map_err(|e| Error::file_write(&backup, e))?;
        info!("Backed up {} to {}", self.path.display(), backup.display());
        Ok(backup)
    }

    /// Compares the original bytes against another file
    pub fn compare_with(&self, other: impl AsRef<Path>) -> Result<Comparison> {
        let other = other.as_ref();
        let data = std::fs::read(other).map_err(|e| Error::file_read(other, e))?;
        Ok(diff::compare(&self.original, &data, &self.codepage))
    }
}

/// Splits editable text into one string per section
///
/// Only the single line ending a text editor appends is dropped; blank lines
/// are kept as empty edits so that later lines stay with their sections.
pub fn split_editable(joined: &str) -> Vec<String> {
    let body = match joined.strip_suffix(SEPARATOR) {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => joined,
    };
    if body.is_empty() {
        return Vec::new();
    }
    body.split(SEPARATOR)
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// `dialog.dlg` becomes `dialog.dlg.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(data: &[u8]) -> DialogFile {
        DialogFile::from_bytes("mem.dlg", data.to_vec(), &Scanner::new(), WriterConfig::default())
    }

    #[test]
    fn test_editable_text_joins_sections() {
        let cp = CodePage::windows_1251();
        let mut data = cp.encode_strict("Добрый день.").unwrap();
        data.extend([0, 1]);
        data.extend(cp.encode_strict("До свидания!").unwrap());
        let file = session(&data);
        assert_eq!(file.editable_text(), "Добрый день.\nДо свидания!");
    }

    #[test]
    fn test_split_editable() {
        assert_eq!(split_editable("a\r\nb\n"), vec!["a", "b"]);
        assert_eq!(split_editable("one"), vec!["one"]);
        assert_eq!(split_editable("\nb\nc"), vec!["", "b", "c"]);
        assert_eq!(split_editable("a\n\n"), vec!["a", ""]);
        assert!(split_editable("").is_empty());
        assert!(split_editable("\n").is_empty());
    }

    fn three_lines() -> Vec<u8> {
        let cp = CodePage::windows_1251();
        let mut data = Vec::new();
        for line in ["Первая строка.", "Вторая строка.", "Третья строка."] {
            data.extend(cp.encode_strict(line).unwrap());
            data.extend([0, 0, 1]);
        }
        data
    }

    #[test]
    fn test_cleared_first_line_keeps_alignment() {
        let data = three_lines();
        let file = session(&data);
        let edited = split_editable("\nВторая строка.\nТретья строка.\n");
        let outcome = file.apply_texts(&edited).unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.changed_sections, vec![0]);

        let rescanned = session(&outcome.buffer);
        let texts: Vec<&str> = rescanned.sections().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Вторая строка.", "Третья строка."]);
        assert_eq!(&outcome.buffer[16..], &data[16..]);
    }

    #[test]
    fn test_file_without_text_round_trips_strictly() {
        let file = DialogFile::from_bytes(
            "mem.dlg",
            vec![1, 2, 3],
            &Scanner::new(),
            WriterConfig::new().strict(),
        );
        assert!(file.sections().is_empty());
        let outcome = file.apply_texts(&split_editable(&file.editable_text())).unwrap();
        assert_eq!(outcome.buffer, vec![1, 2, 3]);
        assert!(outcome.is_unchanged());
    }

    #[test]
    fn test_save_compares_against_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("three.dlg");
        let data = three_lines();
        std::fs::write(&source, &data).unwrap();
        let file = DialogFile::open(&source).unwrap();

        // The source changing on disk after loading must not show up as a difference.
        std::fs::write(&source, b"replaced").unwrap();
        let copy = dir.path().join("three.new.dlg");
        let edited = file.editable_text().replace("Третья", "Другая");
        let saved = file.save_with_updated_text(&edited, Some(copy.as_path())).unwrap();
        assert!(saved.unexpected.is_empty());
        assert_eq!(saved.write.changed_sections, vec![2]);
        assert_eq!(std::fs::read(&copy).unwrap().len(), data.len());
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(backup_path(Path::new("/tmp/x.dlg")), PathBuf::from("/tmp/x.dlg.bak"));
    }

    #[test]
    fn test_apply_texts_unchanged() {
        let data = b"\x02Hello there\x00\x00".to_vec();
        let file = session(&data);
        let texts: Vec<String> = file.sections().iter().map(|s| s.text.clone()).collect();
        assert_eq!(file.apply_texts(&texts).unwrap().buffer, data);
    }
}
