use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

use crate::attendance::{UnknownCodePolicy, DEFAULT_FOOTER_PATTERNS, DEFAULT_SECTION_PATTERNS};
use reportcard_models::{DAY_HEADER, DEFAULT_VOCABULARY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub parser: ParserSettings,
    pub letters: LettersConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub document_processing_port: u16,
    pub letter_composition_port: u16,
    pub max_request_size: usize,
}

/// Serializable form of the attendance parser configuration.
///
/// Compiled into an [`crate::attendance::ParserConfig`] before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Attendance codes in match-priority order
    pub vocabulary: Vec<String>,
    pub unknown_codes: UnknownCodePolicy,
    pub day_header: String,
    /// Physical lines inspected after an index line
    pub lookahead: usize,
    /// School name printed in page headers and footers
    pub institution_name: Option<String>,
    /// Case-insensitive patterns for header, total and footer lines
    pub section_patterns: Vec<String>,
    /// Case-insensitive phrases cut from a row's code tail, up to end of row
    pub footer_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LettersConfig {
    pub default_template: String,
    pub apply_grade_cutoff: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("REPORTCARD").separator("__"));

        config.build()?.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                document_processing_port: 8083,
                letter_composition_port: 8084,
                max_request_size: 16 * 1024 * 1024, // 16MB
            },
            parser: ParserSettings::default(),
            letters: LettersConfig {
                default_template: "progress_letter".to_string(),
                apply_grade_cutoff: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
        }
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY.iter().map(|c| c.to_string()).collect(),
            unknown_codes: UnknownCodePolicy::Emit,
            day_header: DAY_HEADER.to_string(),
            lookahead: 5,
            institution_name: None,
            section_patterns: DEFAULT_SECTION_PATTERNS.iter().map(|p| p.to_string()).collect(),
            footer_patterns: DEFAULT_FOOTER_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}
