//! Byte-by-byte comparison of two buffers with decoded context.

use crate::codepage::CodePage;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Bytes of context shown on each side of a difference
pub const CONTEXT_RADIUS: usize = 5;

/// One differing offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Offset of the differing byte
    pub offset: usize,
    /// Byte in the original buffer
    pub original: u8,
    /// Byte in the updated buffer
    pub updated: u8,
    /// Decoded original bytes around the offset
    pub original_context: String,
    /// Decoded updated bytes around the offset
    pub updated_context: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset {:#x}: {:#04x} -> {:#04x} ({:?} -> {:?})",
            self.offset, self.original, self.updated, self.original_context, self.updated_context
        )
    }
}

/// Outcome of comparing two buffers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Length of the original buffer
    pub original_len: usize,
    /// Length of the updated buffer
    pub updated_len: usize,
    /// Differences within the common prefix, in offset order
    pub differences: Vec<Difference>,
}

impl Comparison {
    /// Returns true if both buffers are byte-identical
    pub fn is_identical(&self) -> bool {
        !self.size_differs() && self.differences.is_empty()
    }

    /// Returns true if the buffers have different lengths
    pub fn size_differs(&self) -> bool {
        self.original_len != self.updated_len
    }

    /// Differences at offsets not listed in `expected`
    pub fn unexpected<'a>(
        &'a self,
        expected: &'a BTreeSet<usize>,
    ) -> impl Iterator<Item = &'a Difference> + 'a {
        self.differences
            .iter()
            .filter(move |d| !expected.contains(&d.offset))
    }
}

/// Compares `original` and `updated` offset by offset
pub fn compare(original: &[u8], updated: &[u8], codepage: &CodePage) -> Comparison {
    let context = |data: &[u8], offset: usize| {
        let start = offset.saturating_sub(CONTEXT_RADIUS);
        let end = (offset + CONTEXT_RADIUS + 1).min(data.len());
        codepage.safe_decode(&data[start..end])
    };

    let differences = original
        .iter()
        .zip(updated)
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(offset, (&a, &b))| Difference {
            offset,
            original: a,
            updated: b,
            original_context: context(original, offset),
            updated_context: context(updated, offset),
        })
        .collect();

    Comparison {
        original_len: original.len(),
        updated_len: updated.len(),
        differences,
    }
}

/// Reads two files and compares them
pub fn compare_files(
    original: impl AsRef<Path>,
    updated: impl AsRef<Path>,
    codepage: &CodePage,
) -> Result<Comparison> {
    let (original, updated) = (original.as_ref(), updated.as_ref());
    let a = std::fs::read(original).map_err(|e| Error::file_read(original, e))?;
    let b = std::fs::read(updated).map_err(|e| Error::file_read(updated, e))?;
    Ok(compare(&a, &b, codepage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let cp = CodePage::windows_1251();
        let cmp = compare(b"abc", b"abc", &cp);
        assert!(cmp.is_identical());
    }

    #[test]
    fn test_differences_with_context() {
        let cp = CodePage::windows_1251();
        let cmp = compare(b"Hello world", b"Hellx world!", &cp);
        assert!(cmp.size_differs());
        assert_eq!(cmp.differences.len(), 1);
        let d = &cmp.differences[0];
        assert_eq!(d.offset, 4);
        assert_eq!(d.original_context, "Hello worl");
        assert_eq!(d.updated_context, "Hellx worl");
    }

    #[test]
    fn test_context_uses_placeholder() {
        let cp = CodePage::windows_1251();
        let cmp = compare(b"\x98a", b"\x98b", &cp);
        assert_eq!(cmp.differences[0].original_context, "\u{2400}a");
    }

    #[test]
    fn test_unexpected_filter() {
        let cp = CodePage::windows_1251();
        let cmp = compare(b"abcd", b"xbcy", &cp);
        let expected: BTreeSet<usize> = [0].into_iter().collect();
        let offsets: Vec<_> = cmp.unexpected(&expected).map(|d| d.offset).collect();
        assert_eq!(offsets, vec![3]);
    }
}
