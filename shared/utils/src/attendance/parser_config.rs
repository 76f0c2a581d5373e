//! Runtime configuration for the attendance parser.
//!
//! Everything the parser matches against (code vocabulary, header/footer
//! patterns, lookahead window) lives in one `ParserConfig` value that is
//! passed to the extractor.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ParserSettings;
use crate::error::{ReportError, ReportResult};

/// Section header, total and footer lines that end a student row.
pub const DEFAULT_SECTION_PATTERNS: &[&str] = &[
    r"^teacher:",
    r"^course:",
    r"^section:",
    r"^expression:",
    r"^total membership:",
    r"^total attendance:",
    r"^\* student off track",
    r"^class attendance audit",
    r"^page \d+",
    r"^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*",
    r"^[amtf\s]*w[amtwf\s]*$",
    r"^\d+\s+\d+\s+\d+",
    r"^student\s+gr\.",
    r"^mem\.att\.",
];

/// Page furniture that leaks into the code tail of the last row on a page.
pub const DEFAULT_FOOTER_PATTERNS: &[&str] = &[r"\bclass attendance audit.*", r"\bpage \d+ of \d+.*"];

/// What the tokenizer does with a character no vocabulary entry matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCodePolicy {
    /// Skip the character
    Drop,
    /// Keep it as a one-character token so it is tallied under "other"
    Emit,
}

/// Compiled parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub vocabulary: Vec<String>,
    pub unknown_codes: UnknownCodePolicy,
    pub day_header: String,
    pub lookahead: usize,
    pub(crate) index_line: Regex,
    pub(crate) list_prefix: Regex,
    pub(crate) numeric_run: Regex,
    pub(crate) trailing_digits: Regex,
    pub(crate) non_code: Regex,
    pub(crate) section_lines: Vec<Regex>,
    pub(crate) footer_phrases: Vec<Regex>,
    pub(crate) banner_words: Regex,
    pub(crate) name_fragment: Regex,
    pub(crate) date_like: Regex,
    pub(crate) code_hint: Option<Regex>,
    pub(crate) membership_total: Regex,
}

impl ParserConfig {
    pub fn from_settings(settings: &ParserSettings) -> ReportResult<Self> {
        if settings.vocabulary.iter().any(|code| code.is_empty()) {
            return Err(ReportError::configuration("attendance vocabulary contains an empty code"));
        }
        if settings.lookahead == 0 {
            return Err(ReportError::configuration("parser lookahead must be at least one line"));
        }

        let institution = settings
            .institution_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(regex::escape);

        let mut section_lines = settings
            .section_patterns
            .iter()
            .map(|p| case_insensitive(p))
            .collect::<ReportResult<Vec<_>>>()?;
        let mut footer_phrases = settings
            .footer_patterns
            .iter()
            .map(|p| case_insensitive(p))
            .collect::<ReportResult<Vec<_>>>()?;
        if let Some(name) = &institution {
            section_lines.push(case_insensitive(&format!("^{}", name))?);
            footer_phrases.push(case_insensitive(&format!("{}.*", name))?);
        }

        // Only codes that start and end on a word character can be matched
        // with word boundaries; "-" is left to the tokenizer.
        let hint_codes: Vec<String> = settings
            .vocabulary
            .iter()
            .filter(|code| {
                let word = |c: Option<char>| c.map(|c| c.is_alphanumeric()).unwrap_or(false);
                word(code.chars().next()) && word(code.chars().last())
            })
            .map(|code| regex::escape(code.as_str()))
            .collect();
        let code_hint = if hint_codes.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"\b(?:{})\b", hint_codes.join("|")))?)
        };

        Ok(Self {
            vocabulary: settings.vocabulary.clone(),
            unknown_codes: settings.unknown_codes,
            day_header: settings.day_header.clone(),
            lookahead: settings.lookahead,
            index_line: Regex::new(r"^\d+[.)]\s+")?,
            list_prefix: Regex::new(r"^\s*\d+[.)]?\s*")?,
            numeric_run: Regex::new(r"\b\d+\b")?,
            trailing_digits: Regex::new(r"\d+$")?,
            non_code: Regex::new(r"[^A-Za-z/]+")?,
            section_lines,
            footer_phrases,
            banner_words: case_insensitive(r"\b(?:fe)?male\b")?,
            name_fragment: Regex::new(r"^[A-Za-z\s,.'-]+$")?,
            date_like: Regex::new(r"\d{2}/\d{2}/\d{2}")?,
            code_hint,
            membership_total: case_insensitive(r"total membership:\s*(\d+)")?,
        })
    }

    pub fn with_unknown_codes(mut self, policy: UnknownCodePolicy) -> Self {
        self.unknown_codes = policy;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::from_settings(&ParserSettings::default())
            .expect("built-in parser patterns are valid")
    }
}

fn case_insensitive(pattern: &str) -> ReportResult<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}
