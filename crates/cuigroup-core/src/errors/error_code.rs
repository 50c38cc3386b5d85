//! ErrorCode trait for stable, machine-readable error identifiers.

/// Trait for mapping cuigroup errors to stable error code strings.
/// Every error enum implements this so the CLI (and any other outer surface)
/// can report a structured code alongside the message.
pub trait ErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_message(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const MISSING_RECORD: &str = "MISSING_RECORD";
pub const DUPLICATE_RECORD: &str = "DUPLICATE_RECORD";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const IMPORT_FAILED: &str = "IMPORT_FAILED";
