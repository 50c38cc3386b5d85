//! Grouping errors: feature loading, resolution, and result queries.

use super::error_code::{self, ErrorCode};
use super::ConfigError;
use crate::types::RecordKey;

/// Errors that can occur while building or querying a grouping.
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A record referenced by the universe has no features in the provider.
    #[error("Record {key} is absent from the feature store of dataset '{dataset}'")]
    MissingRecord { dataset: String, key: RecordKey },

    /// A record key was supplied twice.
    #[error("Record {key} appears more than once")]
    DuplicateRecord { key: RecordKey },

    #[error("Supergroup {index} does not exist (result has {count} supergroups)")]
    SupergroupNotFound { index: usize, count: usize },

    #[error("Feature provider failed: {message}")]
    Provider { message: String },
}

impl GroupingError {
    /// Whether this error is a configuration-kind failure that aborts a run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::MissingRecord { .. } | Self::DuplicateRecord { .. }
        )
    }

    /// Whether this error is a recoverable lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SupergroupNotFound { .. })
    }
}

impl ErrorCode for GroupingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::MissingRecord { .. } => error_code::MISSING_RECORD,
            Self::DuplicateRecord { .. } => error_code::DUPLICATE_RECORD,
            Self::SupergroupNotFound { .. } => error_code::NOT_FOUND,
            Self::Provider { .. } => error_code::PROVIDER_ERROR,
        }
    }
}

/// Convert foreign errors into `GroupingError::Provider` at the provider seam.
pub trait GroupingResultExt<T> {
    fn provider_err(self) -> Result<T, GroupingError>;
}

impl<T, E: std::fmt::Display> GroupingResultExt<T> for Result<T, E> {
    fn provider_err(self) -> Result<T, GroupingError> {
        self.map_err(|e| GroupingError::Provider {
            message: e.to_string(),
        })
    }
}
