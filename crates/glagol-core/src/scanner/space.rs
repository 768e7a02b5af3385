//! Available-space computation: turns surviving candidates into sections.

use super::stages::Candidate;
use crate::section::TextSection;
use encoding_rs::Encoding;
use std::collections::BTreeSet;

/// Returns true for bytes that count as reclaimable padding
pub fn is_padding(byte: u8) -> bool {
    byte == 0x00 || byte == b' '
}

/// Builds a section from `candidate`, claiming padding from `data`.
///
/// Without a trailing marker the section extends across every null or space
/// after the text, and all of those bytes become writable padding. With a
/// marker, only the null/space bytes between the text and the marker are
/// padding; the section still extends across the nulls after the marker, but
/// those are never written.
pub(crate) fn build_section(
    candidate: Candidate,
    data: &[u8],
    encoding: &'static Encoding,
) -> Option<TextSection> {
    let start = *candidate.positions.first()?;
    let last_text = *candidate.positions.last()?;
    let marker_start = candidate.trailing_positions.first().copied();

    let limit = marker_start.unwrap_or(data.len());
    let padding: BTreeSet<usize> = (last_text + 1..limit)
        .take_while(|&offset| is_padding(data[offset]))
        .collect();

    let end = match candidate.trailing_positions.last() {
        Some(&marker_end) => {
            let after = marker_end + 1;
            after
                + data[after.min(data.len())..]
                    .iter()
                    .take_while(|&&b| is_padding(b))
                    .count()
        }
        None => padding.last().map_or(last_text + 1, |&p| p + 1),
    };

    Some(TextSection {
        text: candidate.text(),
        start,
        end,
        encoding,
        trailing_control: candidate.trailing_text(),
        text_byte_positions: candidate.positions.into_iter().collect(),
        padding_byte_positions: padding,
        trailing_control_positions: candidate.trailing_positions.into_iter().collect(),
    })
}
