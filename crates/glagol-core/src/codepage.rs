//! Fixed single-byte code page used by `.dlg` files.
//!
//! Dialog files store text in a legacy 8-bit code page (Windows-1251 in every
//! file seen so far). Every byte is decoded on its own, so any byte boundary is
//! a character boundary. A handful of byte values have no assigned character;
//! those are reported as undecodable so the scanner can protect them.
//!
//! The tables are built once from [`encoding_rs`] and then used for per-byte
//! lookups in both directions. `encoding_rs` itself is never used to encode,
//! because its encoder replaces unmappable characters with HTML numeric
//! character references, which would change the byte length of a section.

use encoding_rs::Encoding;
use std::collections::HashMap;

/// Glyph substituted for an undecodable byte by [`CodePage::safe_decode`]
pub const PLACEHOLDER: char = '\u{2400}';

/// Byte written in place of a character the code page cannot represent
pub const SUBSTITUTE: u8 = b'?';

/// The one Windows-1251 byte that has no assigned character
pub const WINDOWS_1251_UNDEFINED: &[u8] = &[0x98];

/// Result of encoding a string with substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The encoded bytes, one per input character
    pub bytes: Vec<u8>,
    /// Number of characters replaced by [`SUBSTITUTE`]
    pub substituted: usize,
}

impl Encoded {
    /// Returns true if any character had to be substituted
    pub fn had_substitutions(&self) -> bool {
        self.substituted > 0
    }
}

/// A single-byte code page with explicit undefined bytes
#[derive(Debug, Clone)]
pub struct CodePage {
    encoding: &'static Encoding,
    decode_table: [Option<char>; 256],
    encode_table: HashMap<char, u8>,
}

impl Default for CodePage {
    fn default() -> Self {
        Self::windows_1251()
    }
}

impl CodePage {
    /// Windows-1251 with its unassigned byte marked undefined
    pub fn windows_1251() -> Self {
        Self::new(encoding_rs::WINDOWS_1251, WINDOWS_1251_UNDEFINED)
    }

    /// Tables for `encoding` with its known undefined bytes
    pub fn for_encoding(encoding: &'static Encoding) -> Self {
        if encoding == encoding_rs::WINDOWS_1251 {
            Self::windows_1251()
        } else {
            Self::new(encoding, &[])
        }
    }

    /// Builds lookup tables for a single-byte `encoding`.
    ///
    /// Bytes listed in `undefined` decode to nothing even if `encoding_rs`
    /// maps them (WHATWG assigns C1 controls to gaps that legacy decoders
    /// reject).
    pub fn new(encoding: &'static Encoding, undefined: &[u8]) -> Self {
        let mut decode_table = [None; 256];
        let mut encode_table = HashMap::with_capacity(256);

        for byte in 0..=u8::MAX {
            if undefined.contains(&byte) {
                continue;
            }
            let buf = [byte];
            let (decoded, had_errors) = encoding.decode_without_bom_handling(&buf);
            if had_errors {
                continue;
            }
            let mut chars = decoded.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                decode_table[byte as usize] = Some(ch);
                encode_table.entry(ch).or_insert(byte);
            }
        }

        Self {
            encoding,
            decode_table,
            encode_table,
        }
    }

    /// The underlying `encoding_rs` encoding
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// WHATWG name of the encoding
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decodes one byte, or `None` when the byte has no character
    pub fn decode_byte(&self, byte: u8) -> Option<char> {
        self.decode_table[byte as usize]
    }

    /// Returns true if `byte` decodes to a character
    pub fn is_decodable(&self, byte: u8) -> bool {
        self.decode_byte(byte).is_some()
    }

    /// Decodes `bytes`, replacing each undecodable byte with [`PLACEHOLDER`]
    pub fn safe_decode(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| self.decode_byte(b).unwrap_or(PLACEHOLDER))
            .collect()
    }

    /// Encodes one character, or `None` when it is not representable
    pub fn encode_char(&self, ch: char) -> Option<u8> {
        self.encode_table.get(&ch).copied()
    }

    /// Encodes `text`, replacing unrepresentable characters with [`SUBSTITUTE`]
    pub fn encode(&self, text: &str) -> Encoded {
        let mut substituted = 0;
        let bytes = text
            .chars()
            .map(|ch| {
                self.encode_char(ch).unwrap_or_else(|| {
                    substituted += 1;
                    SUBSTITUTE
                })
            })
            .collect();
        Encoded { bytes, substituted }
    }

    /// Encodes `text`, failing on the first unrepresentable character
    pub fn encode_strict(&self, text: &str) -> Option<Vec<u8>> {
        text.chars().map(|ch| self.encode_char(ch)).collect()
    }

    /// Number of bytes `text` occupies once encoded
    pub fn encoded_len(&self, text: &str) -> usize {
        text.chars().count()
    }
}
