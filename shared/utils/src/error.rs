use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ReportError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Text extraction error: {message}")]
    Extraction { message: String },

    #[error("Gradebook error: {message}")]
    Gradebook { message: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ReportError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn gradebook(message: impl Into<String>) -> Self {
        Self::Gradebook {
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Extraction { .. } => "TEXT_EXTRACTION_ERROR",
            Self::Gradebook { .. } => "GRADEBOOK_ERROR",
            Self::Template { .. } => "TEMPLATE_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Extraction { .. } => 422,
            Self::Gradebook { .. } => 422,
            Self::Template { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<ReportError> for ErrorResponse {
    fn from(error: ReportError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

// Conversion from common error types
impl From<csv::Error> for ReportError {
    fn from(error: csv::Error) -> Self {
        Self::gradebook(error.to_string())
    }
}

impl From<calamine::XlsxError> for ReportError {
    fn from(error: calamine::XlsxError) -> Self {
        Self::gradebook(error.to_string())
    }
}

impl From<regex::Error> for ReportError {
    fn from(error: regex::Error) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<config::ConfigError> for ReportError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}
