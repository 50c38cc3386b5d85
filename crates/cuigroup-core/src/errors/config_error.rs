//! Configuration errors.

use super::error_code::{self, ErrorCode};

/// Errors that can occur during configuration loading and validation.
///
/// All variants are fatal for a grouping run: an invalid configuration is
/// rejected before any feature is loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Unknown similarity metric '{name}'; acceptable values are 'cosine' or 'jaccard'")]
    UnknownMetric { name: String },

    #[error("Unknown grouping policy '{name}'; acceptable values are 'combined' or 'conjunctive'")]
    UnknownPolicy { name: String },

    #[error("Unknown record source '{name}'; acceptable values are 'ctgov', 'pubmed' or 'ema'")]
    UnknownSource { name: String },

    #[error("Distance threshold {value} is outside [0, 1]")]
    ThresholdOutOfRange { value: f64 },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
