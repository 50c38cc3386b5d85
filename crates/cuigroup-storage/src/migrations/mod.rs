//! Schema migrations tracked with `PRAGMA user_version`.

pub mod v001_features;
pub mod v002_groupings;

use cuigroup_core::errors::StorageError;
use rusqlite::Connection;
use tracing::info;

use crate::to_storage_err;

/// Ordered `(version, sql)` pairs. Versions are contiguous from 1.
const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_features::MIGRATION_SQL),
    (2, v002_groupings::MIGRATION_SQL),
];

/// Highest schema version this build knows.
pub const LATEST_VERSION: u32 = 2;

/// Current schema version of the database.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(to_storage_err)
}

/// Apply every migration newer than the database's `user_version`, each in
/// its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;
    if current > LATEST_VERSION {
        return Err(StorageError::MigrationFailed {
            version: current,
            message: format!("database schema is newer than this build (max {LATEST_VERSION})"),
        });
    }

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.pragma_update(None, "user_version", version).map_err(failed)?;
        tx.commit().map_err(failed)?;
        info!(version, "applied migration");
    }
    Ok(())
}
