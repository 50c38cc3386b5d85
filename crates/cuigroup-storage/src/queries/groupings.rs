//! Queries for the groupings and grouping_members tables.

use cuigroup_core::errors::StorageError;
use cuigroup_core::types::RecordKey;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::features::parse_source;
use crate::to_storage_err;

/// A saved grouping header row.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingRow {
    pub dataset: String,
    pub metric: String,
    pub threshold: f64,
    pub policy: String,
    pub record_count: i64,
    pub supergroup_count: i64,
    pub fingerprint: u64,
    pub saved_at: i64,
}

/// Insert a grouping header. The tag must not exist yet.
pub fn insert_grouping(conn: &Connection, row: &GroupingRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO groupings
            (dataset, metric, threshold, policy, record_count, supergroup_count, fingerprint, saved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.dataset,
            row.metric,
            row.threshold,
            row.policy,
            row.record_count,
            row.supergroup_count,
            row.fingerprint as i64,
            row.saved_at,
        ],
    )
    .map_err(to_storage_err)?;
    Ok(())
}

/// Insert the members of one supergroup.
pub fn insert_members<'a>(
    conn: &Connection,
    dataset: &str,
    metric: &str,
    threshold: f64,
    supergroup: usize,
    members: impl IntoIterator<Item = &'a RecordKey>,
) -> Result<usize, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO grouping_members
                (dataset, metric, threshold, supergroup, source, record_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(to_storage_err)?;
    let mut inserted = 0;
    for key in members {
        inserted += stmt
            .execute(params![
                dataset,
                metric,
                threshold,
                supergroup as i64,
                key.source.as_str(),
                key.record_id,
            ])
            .map_err(to_storage_err)?;
    }
    Ok(inserted)
}

pub fn get_grouping(
    conn: &Connection,
    dataset: &str,
    metric: &str,
    threshold: f64,
) -> Result<Option<GroupingRow>, StorageError> {
    conn.prepare_cached(
        "SELECT dataset, metric, threshold, policy, record_count, supergroup_count, fingerprint, saved_at
         FROM groupings WHERE dataset = ?1 AND metric = ?2 AND threshold = ?3",
    )
    .map_err(to_storage_err)?
    .query_row(params![dataset, metric, threshold], grouping_row)
    .optional()
    .map_err(to_storage_err)
}

/// `(supergroup, key)` pairs of a saved grouping, ordered by supergroup.
pub fn get_members(
    conn: &Connection,
    dataset: &str,
    metric: &str,
    threshold: f64,
) -> Result<Vec<(usize, RecordKey)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT supergroup, source, record_id FROM grouping_members
             WHERE dataset = ?1 AND metric = ?2 AND threshold = ?3
             ORDER BY supergroup, source, record_id",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![dataset, metric, threshold], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(to_storage_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (supergroup, source, record_id) = row.map_err(to_storage_err)?;
        if supergroup < 0 {
            return Err(StorageError::InvalidData {
                message: format!("negative supergroup index {supergroup}"),
            });
        }
        out.push((supergroup as usize, RecordKey::new(parse_source(&source)?, record_id)));
    }
    Ok(out)
}

/// Saved grouping headers, optionally restricted to one dataset, ordered by
/// dataset, metric, then threshold.
pub fn list_groupings(
    conn: &Connection,
    dataset: Option<&str>,
) -> Result<Vec<GroupingRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT dataset, metric, threshold, policy, record_count, supergroup_count, fingerprint, saved_at
             FROM groupings WHERE ?1 IS NULL OR dataset = ?1
             ORDER BY dataset, metric, threshold",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![dataset], grouping_row)
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Delete a grouping and its members. Returns whether it existed.
pub fn delete_grouping(
    conn: &Connection,
    dataset: &str,
    metric: &str,
    threshold: f64,
) -> Result<bool, StorageError> {
    conn.execute(
        "DELETE FROM grouping_members WHERE dataset = ?1 AND metric = ?2 AND threshold = ?3",
        params![dataset, metric, threshold],
    )
    .map_err(to_storage_err)?;
    let deleted = conn
        .execute(
            "DELETE FROM groupings WHERE dataset = ?1 AND metric = ?2 AND threshold = ?3",
            params![dataset, metric, threshold],
        )
        .map_err(to_storage_err)?;
    Ok(deleted > 0)
}

fn grouping_row(row: &Row<'_>) -> rusqlite::Result<GroupingRow> {
    Ok(GroupingRow {
        dataset: row.get(0)?,
        metric: row.get(1)?,
        threshold: row.get(2)?,
        policy: row.get(3)?,
        record_count: row.get(4)?,
        supergroup_count: row.get(5)?,
        fingerprint: row.get::<_, i64>(6)? as u64,
        saved_at: row.get(7)?,
    })
}
