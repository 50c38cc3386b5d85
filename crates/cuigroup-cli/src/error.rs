//! CLI error type and process exit codes.
//!
//! Exit code 0 on success, 1 on any error, 2 when stored data is corrupt.

use cuigroup_core::errors::{ConfigError, ErrorCode, GroupingError, StorageError};

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CliExitCode {
    Success = 0,
    Error = 1,
    Corruption = 2,
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grouping(#[from] GroupingError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Cannot write output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> CliExitCode {
        if is_corruption_indicator(self) {
            CliExitCode::Corruption
        } else {
            CliExitCode::Error
        }
    }
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Grouping(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Output(_) => "OUTPUT_ERROR",
        }
    }
}

/// Whether the error means the database content cannot be trusted.
pub fn is_corruption_indicator(error: &CliError) -> bool {
    matches!(
        error,
        CliError::Storage(StorageError::CorruptionDetected { .. })
            | CliError::Storage(StorageError::InvalidData { .. })
    )
}
