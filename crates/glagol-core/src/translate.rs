//! Byte-budgeted translation driver.
//!
//! No translation backend ships with this crate. Callers implement
//! [`Translator`] over whatever service they use and let
//! [`translate_within_budget`] enforce the section capacity.

use crate::codepage::CodePage;
use crate::error::{Error, Result};
use crate::section::TextSection;
use tracing::{debug, warn};

/// Attempts made before giving up
pub const DEFAULT_ATTEMPTS: usize = 3;

/// What a translator is asked to produce
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    /// Text to translate
    pub source: &'a str,
    /// Maximum encoded length of the result
    pub max_bytes: usize,
    /// Code page the result will be written in
    pub codepage: &'a CodePage,
    /// Other texts of the same dialog, for reference only
    pub context: &'a [String],
}

impl<'a> TranslationRequest<'a> {
    /// Request for a section, budgeted to its capacity
    pub fn for_section(section: &'a TextSection, codepage: &'a CodePage, context: &'a [String]) -> Self {
        Self {
            source: &section.text,
            max_bytes: section.capacity(),
            codepage,
            context,
        }
    }

    /// Returns true if `text` is representable and fits the budget
    pub fn fits(&self, text: &str) -> bool {
        self.codepage
            .encode_strict(text)
            .is_some_and(|bytes| bytes.len() <= self.max_bytes)
    }
}

/// A translation backend
pub trait Translator {
    /// Produces a first translation
    fn translate(&mut self, request: &TranslationRequest<'_>) -> Result<String>;

    /// Produces a shorter version of `previous`, which encoded to `current_bytes`
    fn shorten(
        &mut self,
        request: &TranslationRequest<'_>,
        previous: &str,
        current_bytes: usize,
    ) -> Result<String>;

    /// Rejects output that is not usable at all; a rejected result is retranslated
    fn accepts(&self, translation: &str) -> bool {
        !translation.trim().is_empty()
    }
}

/// Asks `translator` for a translation that fits `request.max_bytes`
///
/// Unusable output is retranslated and overlong output is shortened, up to
/// `attempts` rounds in total.
pub fn translate_within_budget<T: Translator + ?Sized>(
    translator: &mut T,
    request: &TranslationRequest<'_>,
    attempts: usize,
) -> Result<String> {
    let attempts = attempts.max(1);
    let mut current = translator.translate(request)?;

    for attempt in 1..=attempts {
        let encoded = request.codepage.encode(&current);
        let usable = translator.accepts(&current) && !encoded.had_substitutions();

        if usable && encoded.bytes.len() <= request.max_bytes {
            debug!(
                "Translation fits in {} of {} bytes after {} attempt(s)",
                encoded.bytes.len(),
                request.max_bytes,
                attempt
            );
            return Ok(current);
        }
        if attempt == attempts {
            break;
        }

        current = if usable {
            warn!(
                "Translation is {} bytes, limit is {}; asking for a shorter one",
                encoded.bytes.len(),
                request.max_bytes
            );
            translator.shorten(request, &current, encoded.bytes.len())?
        } else {
            warn!("Translation rejected, retranslating");
            translator.translate(request)?
        };
    }

    Err(Error::translation(format!(
        "no translation within {} bytes after {} attempts",
        request.max_bytes, attempts
    )))
}
