//! Error handling for cuigroup.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod grouping_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::ErrorCode;
pub use grouping_error::{GroupingError, GroupingResultExt};
pub use storage_error::StorageError;
