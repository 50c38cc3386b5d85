//! Storage errors.

use super::error_code::{self, ErrorCode};

/// Errors that can occur in the SQLite persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("No grouping saved under {tag}")]
    GroupingNotFound { tag: String },

    #[error("Database corruption detected: {details}")]
    CorruptionDetected { details: String },

    #[error("Import of {path} failed: {message}")]
    ImportFailed { path: String, message: String },

    #[error("Invalid stored value: {message}")]
    InvalidData { message: String },
}

impl StorageError {
    /// Whether this error is a recoverable lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GroupingNotFound { .. })
    }
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SqliteError { .. } => error_code::STORAGE_ERROR,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::GroupingNotFound { .. } => error_code::NOT_FOUND,
            Self::CorruptionDetected { .. } | Self::InvalidData { .. } => error_code::DB_CORRUPT,
            Self::ImportFailed { .. } => error_code::IMPORT_FAILED,
        }
    }
}
