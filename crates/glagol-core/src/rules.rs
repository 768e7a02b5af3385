//! Data-driven heuristic configuration.
//!
//! Every character set, threshold and noise pattern used by the scanner lives
//! in [`HeuristicConfig`]. The built-in defaults are tuned on the dialog files
//! of one game; other data sets can override any field from a TOML file:
//!
//! ```toml
//! unusual_chars = "‡†ЋЌЏ|{}"
//! noise_patterns = ['^[A-Z]{1,4}\d+$']
//! reference_extensions = ["dlg", "ini"]
//! disabled_stages = ["control-code"]
//! undefined_bytes = [0x98]
//! ```
//!
//! A config is compiled once into [`Rules`], which holds the parsed sets and
//! regexes the stages actually consult.

use crate::codepage::CodePage;
use crate::error::{Error, Result};
use crate::scanner::StageKind;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Game-specific glyphs that show up in control codes far more than in text
pub const DEFAULT_UNUSUAL_CHARS: &str =
    "ЂЃѓ†‡€‰Љ‹ЊЌЋЏђ•™љ›њќћџЎўЈ¤Ґ¦§©Є¬®Ї°±Ііґµ¶·№єјЅѕї|{}\\~^`@<>=_";

/// Punctuation and quotes that are never treated as control characters
pub const DEFAULT_EXCLUDED_CHARS: &str = ".,!?;:'\"-()…«»“”„‘’–— \u{a0}";

const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)+$",
    r"^[A-Z]{1,4}\d+[A-Za-z0-9]*$",
    r"^[A-Z0-9]+(?:[<>]=?|=)\d+$",
    r"^\{?D-[A-Z_]+\}?$",
    r"^\[\d+(?:,\d+)*\]$",
];

const DEFAULT_NOISE_LITERALS: &[&str] = &["NULL", "null", "EOF"];

const DEFAULT_REFERENCE_EXTENSIONS: &[&str] = &[
    "dlg", "ini", "txt", "cfg", "dat", "xml", "lua", "scr", "wav", "ogg", "mp3", "bmp", "tga",
    "dds", "png", "jpg", "mdl", "ani", "fx", "psd",
];

/// Heuristic thresholds, character sets and noise tables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicConfig {
    /// WHATWG label of the single-byte code page
    pub encoding: String,
    /// Bytes treated as undecodable in that code page
    pub undefined_bytes: Vec<u8>,
    /// Shortest text kept, in characters
    pub min_text_len: usize,
    /// Runs up to this length get the unusual-ratio check
    pub short_run_len: usize,
    /// Maximum unusual-character ratio for short runs
    pub short_unusual_ratio: f64,
    /// Runs shorter than this get the alphabet-ratio check
    pub ratio_check_len: usize,
    /// Minimum primary-alphabet ratio for short Cyrillic runs
    pub min_primary_ratio: f64,
    /// Minimum Latin ratio for short Latin runs
    pub min_latin_ratio: f64,
    /// Longest control tail peeled after sentence punctuation
    pub max_marker_tail: usize,
    /// Texts up to this length are rejected if they contain unusual characters
    pub short_control_len: usize,
    /// Texts up to this length are rejected for a comma without a following space
    pub comma_check_len: usize,
    /// Texts shorter than this get the punctuation-density check
    pub punctuation_check_len: usize,
    /// Maximum punctuation ratio for short Cyrillic texts
    pub max_punctuation_ratio: f64,
    /// Texts at least this long must contain a space or sentence punctuation
    pub no_space_min_len: usize,
    /// Glyphs typical of control codes
    pub unusual_chars: String,
    /// Characters never learned or peeled as control characters
    pub excluded_chars: String,
    /// Regexes matched against the whole text; a match rejects it
    pub noise_patterns: Vec<String>,
    /// Exact texts rejected as noise
    pub noise_literals: Vec<String>,
    /// File extensions that mark a text as a file reference
    pub reference_extensions: Vec<String>,
    /// Stage names to skip
    pub disabled_stages: Vec<String>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            encoding: "windows-1251".to_string(),
            undefined_bytes: crate::codepage::WINDOWS_1251_UNDEFINED.to_vec(),
            min_text_len: 2,
            short_run_len: 5,
            short_unusual_ratio: 0.2,
            ratio_check_len: 15,
            min_primary_ratio: 0.5,
            min_latin_ratio: 0.4,
            max_marker_tail: 4,
            short_control_len: 5,
            comma_check_len: 10,
            punctuation_check_len: 20,
            max_punctuation_ratio: 0.3,
            no_space_min_len: 12,
            unusual_chars: DEFAULT_UNUSUAL_CHARS.to_string(),
            excluded_chars: DEFAULT_EXCLUDED_CHARS.to_string(),
            noise_patterns: DEFAULT_NOISE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            noise_literals: DEFAULT_NOISE_LITERALS.iter().map(|s| s.to_string()).collect(),
            reference_extensions: DEFAULT_REFERENCE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            disabled_stages: Vec::new(),
        }
    }
}

impl HeuristicConfig {
    /// Creates a config with the built-in defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document; missing fields keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML rules file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::config_read(path, e))?;
        Self::from_toml_str(&source)
    }

    /// Disables a stage by name
    pub fn disable_stage(mut self, stage: StageKind) -> Self {
        self.disabled_stages.push(stage.name().to_string());
        self
    }

    /// Replaces the undecodable byte list
    pub fn undefined_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.undefined_bytes = bytes.into();
        self
    }

    /// Builds the code page described by `encoding` and `undefined_bytes`
    pub fn codepage(&self) -> Result<CodePage> {
        let encoding = encoding_rs::Encoding::for_label(self.encoding.as_bytes())
            .filter(|e| e.is_single_byte())
            .ok_or_else(|| Error::UnsupportedEncoding(self.encoding.clone()))?;
        Ok(CodePage::new(encoding, &self.undefined_bytes))
    }

    /// Compiles the config, failing on any bad pattern or stage name
    pub fn compile(&self) -> Result<Rules> {
        let noise = self
            .noise_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| Error::invalid_pattern(p.as_str(), e)))
            .collect::<Result<Vec<_>>>()?;
        let disabled = self
            .disabled_stages
            .iter()
            .map(|name| name.parse::<StageKind>())
            .collect::<Result<Vec<_>>>()?;
        let reference = reference_regex(&self.reference_extensions)?;

        Ok(Rules {
            unusual: self.unusual_chars.chars().collect(),
            excluded: self.excluded_chars.chars().collect(),
            literals: self.noise_literals.iter().cloned().collect(),
            config: self.clone(),
            reference,
            noise,
            disabled,
        })
    }
}

fn reference_regex(extensions: &[String]) -> Result<Option<Regex>> {
    if extensions.is_empty() {
        return Ok(None);
    }
    let alternatives = extensions
        .iter()
        .map(|ext| regex::escape(ext.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\.(?:{})$", alternatives);
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| Error::invalid_pattern(pattern, e))
}

/// A compiled [`HeuristicConfig`]
#[derive(Debug, Clone)]
pub struct Rules {
    /// The config this was compiled from
    pub config: HeuristicConfig,
    /// Unusual (control-like) characters
    pub unusual: HashSet<char>,
    /// Characters never treated as control characters
    pub excluded: HashSet<char>,
    /// Exact noise texts
    pub literals: HashSet<String>,
    /// Matches a trailing file extension
    pub reference: Option<Regex>,
    /// Compiled noise patterns
    pub noise: Vec<Regex>,
    /// Stages to skip
    pub disabled: Vec<StageKind>,
}

impl Default for Rules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Rules {
    /// Compiles the built-in defaults, dropping any pattern that fails
    pub fn builtin() -> Self {
        let config = HeuristicConfig::default();
        let noise = config
            .noise_patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Dropping built-in noise pattern {}: {}", p, e);
                    None
                }
            })
            .collect();
        let reference = reference_regex(&config.reference_extensions).unwrap_or_else(|e| {
            warn!("Dropping built-in reference extensions: {}", e);
            None
        });

        Self {
            unusual: config.unusual_chars.chars().collect(),
            excluded: config.excluded_chars.chars().collect(),
            literals: config.noise_literals.iter().cloned().collect(),
            reference,
            noise,
            disabled: Vec::new(),
            config,
        }
    }

    /// Returns true if `stage` should run
    pub fn is_enabled(&self, stage: StageKind) -> bool {
        !self.disabled.contains(&stage)
    }

    /// Returns true if `text` matches a noise literal or pattern
    pub fn is_noise(&self, text: &str) -> bool {
        self.literals.contains(text) || self.noise.iter().any(|re| re.is_match(text))
    }

    /// Returns true if `text` ends with a configured file extension
    pub fn has_reference_extension(&self, text: &str) -> bool {
        self.reference.as_ref().is_some_and(|re| re.is_match(text))
    }
}
