//! Structural overview of a raw buffer and phrase lookup.

use crate::codepage::CodePage;
use std::fmt::Write as _;

/// Bytes of context shown on each side of an undecodable byte
pub const HEX_CONTEXT_RADIUS: usize = 5;

/// An offset whose byte has no character in the code page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodableByte {
    /// Offset in the buffer
    pub offset: usize,
    /// The byte value
    pub byte: u8,
    /// Hex dump of the surrounding bytes
    pub context: String,
}

/// Byte statistics for one buffer
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Buffer length
    pub total_bytes: usize,
    /// Occurrences of each byte value
    pub histogram: [usize; 256],
    /// Undecodable bytes in offset order
    pub undecodable: Vec<UndecodableByte>,
}

impl Analysis {
    /// The `n` most frequent byte values with their counts, most frequent first
    pub fn most_common(&self, n: usize) -> Vec<(u8, usize)> {
        let mut counts: Vec<(u8, usize)> = (0..=u8::MAX)
            .map(|b| (b, self.histogram[b as usize]))
            .filter(|&(_, count)| count > 0)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        counts.truncate(n);
        counts
    }

    /// Number of distinct byte values present
    pub fn distinct_bytes(&self) -> usize {
        self.histogram.iter().filter(|&&c| c > 0).count()
    }
}

/// Counts bytes and lists undecodable offsets
pub fn analyze(data: &[u8], codepage: &CodePage) -> Analysis {
    let mut histogram = [0usize; 256];
    let mut undecodable = Vec::new();

    for (offset, &byte) in data.iter().enumerate() {
        histogram[byte as usize] += 1;
        if !codepage.is_decodable(byte) {
            let start = offset.saturating_sub(HEX_CONTEXT_RADIUS);
            let end = (offset + HEX_CONTEXT_RADIUS + 1).min(data.len());
            undecodable.push(UndecodableByte {
                offset,
                byte,
                context: hex(&data[start..end]),
            });
        }
    }

    Analysis {
        total_bytes: data.len(),
        histogram,
        undecodable,
    }
}

/// Space-separated lowercase hex
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Where a phrase occurs in a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Offset of the first byte of the match
    pub offset: usize,
    /// Decoded bytes around the match
    pub context: String,
}

/// Finds every occurrence of `phrase` encoded in `codepage`
///
/// Returns nothing if the phrase cannot be encoded.
pub fn find_phrase(data: &[u8], phrase: &str, codepage: &CodePage, radius: usize) -> Vec<Occurrence> {
    let Some(needle) = codepage.encode_strict(phrase) else {
        return Vec::new();
    };
    if needle.is_empty() || needle.len() > data.len() {
        return Vec::new();
    }

    data.windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle.as_slice())
        .map(|(offset, _)| {
            let start = offset.saturating_sub(radius);
            let end = (offset + needle.len() + radius).min(data.len());
            Occurrence {
                offset,
                context: codepage.safe_decode(&data[start..end]),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_and_undecodable() {
        let cp = CodePage::windows_1251();
        let data = b"\x00\x00ab\x98cd";
        let analysis = analyze(data, &cp);
        assert_eq!(analysis.total_bytes, 7);
        assert_eq!(analysis.histogram[0], 2);
        assert_eq!(analysis.distinct_bytes(), 6);
        assert_eq!(analysis.most_common(1), vec![(0, 2)]);
        assert_eq!(analysis.undecodable.len(), 1);
        assert_eq!(analysis.undecodable[0].offset, 4);
        assert_eq!(analysis.undecodable[0].context, "00 00 61 62 98 63 64");
    }

    #[test]
    fn test_find_phrase() {
        let cp = CodePage::windows_1251();
        let mut data = vec![0x01, 0x02];
        data.extend(cp.encode_strict("Сид, сынок!").unwrap());
        data.push(0);
        let found = find_phrase(&data, "сынок", &cp, 3);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 7);
        assert_eq!(found[0].context, "д, сынок!\u{0}");
        assert!(find_phrase(&data, "中", &cp, 3).is_empty());
    }
}
