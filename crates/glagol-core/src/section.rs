//! Text sections and the protected byte set.

use encoding_rs::Encoding;
use std::collections::BTreeSet;
use std::ops::Range;

/// One contiguous, independently editable run of dialog text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSection {
    /// Decoded editable text, trimmed, without trailing control markers
    pub text: String,
    /// First byte of the section in the original buffer
    pub start: usize,
    /// Exclusive end of the section, including claimed padding
    pub end: usize,
    /// Code page used to decode and re-encode this section
    pub encoding: &'static Encoding,
    /// Non-editable marker characters found after the visible text
    pub trailing_control: String,
    /// Offsets of the bytes that hold visible text
    pub text_byte_positions: BTreeSet<usize>,
    /// Offsets of reclaimable null/space bytes after the visible text
    pub padding_byte_positions: BTreeSet<usize>,
    /// Offsets occupied by the trailing control marker
    pub trailing_control_positions: BTreeSet<usize>,
}

impl TextSection {
    /// Byte range `start..end`
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of bytes the section spans, including padding and markers
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true for a zero-length section
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Offsets the writer may overwrite, in ascending order
    pub fn writable_positions(&self) -> impl Iterator<Item = usize> + '_ {
        // Padding always follows the text, so chaining keeps the order.
        self.text_byte_positions
            .iter()
            .chain(self.padding_byte_positions.iter())
            .copied()
    }

    /// Number of writable bytes (text plus padding)
    pub fn capacity(&self) -> usize {
        self.text_byte_positions.len() + self.padding_byte_positions.len()
    }

    /// Every offset claimed by this section's text, padding or marker
    pub fn claimed_positions(&self) -> BTreeSet<usize> {
        self.text_byte_positions
            .iter()
            .chain(&self.padding_byte_positions)
            .chain(&self.trailing_control_positions)
            .copied()
            .collect()
    }

    /// Returns true if any claimed offset is also claimed by `other`
    pub fn overlaps(&self, other: &TextSection) -> bool {
        if self.end <= other.start || other.end <= self.start {
            return false;
        }
        let mine = self.claimed_positions();
        other.claimed_positions().iter().any(|p| mine.contains(p))
    }

    /// Checks the positional invariants of a single section
    pub fn is_consistent(&self) -> bool {
        let (Some(&first), Some(&last)) = (
            self.text_byte_positions.first(),
            self.text_byte_positions.last(),
        ) else {
            return false;
        };
        if first < self.start || last >= self.end {
            return false;
        }
        let in_bounds = |set: &BTreeSet<usize>| set.iter().all(|p| (self.start..self.end).contains(p));
        if !in_bounds(&self.padding_byte_positions) || !in_bounds(&self.trailing_control_positions) {
            return false;
        }
        if self.padding_byte_positions.first().is_some_and(|&p| p <= last) {
            return false;
        }
        let claimed = self.text_byte_positions.len()
            + self.padding_byte_positions.len()
            + self.trailing_control_positions.len();
        claimed == self.claimed_positions().len()
    }
}

/// Checks that sections are sorted, individually consistent and disjoint
pub fn sections_are_consistent(sections: &[TextSection]) -> bool {
    if !sections.iter().all(TextSection::is_consistent)
        || !sections.windows(2).all(|pair| pair[0].start <= pair[1].start)
    {
        return false;
    }

    // Any earlier section may reach past a later start, not just the previous one.
    let mut claimed = BTreeSet::new();
    let mut max_end = 0;
    for section in sections {
        let positions = section.claimed_positions();
        if section.start < max_end && positions.iter().any(|p| claimed.contains(p)) {
            return false;
        }
        max_end = max_end.max(section.end);
        claimed.extend(positions);
    }
    true
}

/// Offsets that must never be modified on write-back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedBytes {
    positions: BTreeSet<usize>,
}

impl ProtectedBytes {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `offset` as protected
    pub fn insert(&mut self, offset: usize) {
        self.positions.insert(offset);
    }

    /// Returns true if `offset` is protected
    pub fn contains(&self, offset: usize) -> bool {
        self.positions.contains(&offset)
    }

    /// Number of protected offsets
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is protected
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Protected offsets in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied()
    }

    /// Protected offsets inside `range`
    pub fn in_range(&self, range: Range<usize>) -> impl Iterator<Item = usize> + '_ {
        self.positions.range(range).copied()
    }
}

impl FromIterator<usize> for ProtectedBytes {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}
