//! # cuigroup-storage
//!
//! SQLite persistence for cuigroup: per-record concept features, JSON Lines
//! batch import, and saved grouping results keyed by
//! `(dataset, metric, threshold)`.

pub mod connection;
pub mod import;
pub mod migrations;
pub mod provider;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
pub use import::{import_batch_dir, import_batch_file, ImportReport};
pub use provider::SqliteFeatureProvider;
pub use store::{GroupingStore, SavedGrouping};

use cuigroup_core::errors::StorageError;

/// Map any displayable backend error into a `StorageError::SqliteError`.
pub(crate) fn to_storage_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
