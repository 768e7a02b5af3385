//! First pass: split the buffer into candidate runs.
//!
//! Bytes below 0x20 (null included) are hard boundaries and never belong to a
//! run. Every other byte is decoded on its own; undecodable bytes become the
//! placeholder glyph and their offsets are recorded as protected.

use crate::codepage::{CodePage, PLACEHOLDER};
use crate::section::ProtectedBytes;
use tracing::trace;

/// Lowest byte value that may belong to text
pub const FIRST_TEXT_BYTE: u8 = 0x20;

/// A maximal run of non-boundary bytes with per-character offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRun {
    /// Decoded characters, one per source byte
    pub chars: Vec<char>,
    /// Absolute offset of each character
    pub positions: Vec<usize>,
}

impl RawRun {
    /// Offset of the first byte
    pub fn start(&self) -> usize {
        self.positions.first().copied().unwrap_or_default()
    }

    /// Decoded text of the run
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Returns true if any byte failed to decode
    pub fn has_placeholder(&self) -> bool {
        self.chars.contains(&PLACEHOLDER)
    }
}

/// Splits `data` into runs and collects undecodable offsets
pub(crate) fn scan(data: &[u8], codepage: &CodePage) -> (Vec<RawRun>, ProtectedBytes) {
    let mut runs = Vec::new();
    let mut protected = ProtectedBytes::new();
    let mut current = RawRun {
        chars: Vec::new(),
        positions: Vec::new(),
    };

    for (offset, &byte) in data.iter().enumerate() {
        if byte < FIRST_TEXT_BYTE {
            flush(&mut current, &mut runs);
            continue;
        }
        let ch = match codepage.decode_byte(byte) {
            Some(ch) => ch,
            None => {
                trace!("Undecodable byte 0x{:02x} at offset {}", byte, offset);
                protected.insert(offset);
                PLACEHOLDER
            }
        };
        current.chars.push(ch);
        current.positions.push(offset);
    }
    flush(&mut current, &mut runs);

    (runs, protected)
}

fn flush(current: &mut RawRun, runs: &mut Vec<RawRun>) {
    if !current.chars.is_empty() {
        runs.push(RawRun {
            chars: std::mem::take(&mut current.chars),
            positions: std::mem::take(&mut current.positions),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_split_runs() {
        let cp = CodePage::windows_1251();
        let (runs, protected) = scan(b"ab\x00\x01cd\x1fe", &cp);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(), "ab");
        assert_eq!(runs[1].positions, vec![4, 5]);
        assert_eq!(runs[2].start(), 7);
        assert!(protected.is_empty());
    }

    #[test]
    fn test_undecodable_bytes_are_protected() {
        let cp = CodePage::windows_1251();
        let (runs, protected) = scan(b"\x00ab\x98c", &cp);
        assert_eq!(runs.len(), 1);
        assert!(runs[0].has_placeholder());
        assert!(protected.contains(3));
        assert_eq!(protected.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let (runs, protected) = scan(&[], &CodePage::windows_1251());
        assert!(runs.is_empty());
        assert!(protected.is_empty());
    }
}
