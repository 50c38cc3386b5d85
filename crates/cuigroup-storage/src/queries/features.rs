//! Queries for the record_features table.

use cuigroup_core::errors::StorageError;
use cuigroup_core::types::collections::BTreeSet;
use cuigroup_core::types::{FeatureSet, RecordKey, Source};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::to_storage_err;

/// Insert or replace the features of one record.
pub fn upsert_features(
    conn: &Connection,
    dataset: &str,
    key: &RecordKey,
    features: &FeatureSet,
    imported_at: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO record_features
            (dataset, source, record_id, disease_cuis, drug_cuis, imported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(dataset, source, record_id) DO UPDATE SET
            disease_cuis = excluded.disease_cuis,
            drug_cuis = excluded.drug_cuis,
            imported_at = excluded.imported_at",
    )
    .map_err(to_storage_err)?
    .execute(params![
        dataset,
        key.source.as_str(),
        key.record_id,
        encode_cuis(&features.disease_cuis)?,
        encode_cuis(&features.drug_cuis)?,
        imported_at,
    ])
    .map_err(to_storage_err)?;
    Ok(())
}

/// Features of one record, or `None` if the record is unknown.
pub fn get_features(
    conn: &Connection,
    dataset: &str,
    key: &RecordKey,
) -> Result<Option<FeatureSet>, StorageError> {
    let raw: Option<(String, String)> = conn
        .prepare_cached(
            "SELECT disease_cuis, drug_cuis FROM record_features
             WHERE dataset = ?1 AND source = ?2 AND record_id = ?3",
        )
        .map_err(to_storage_err)?
        .query_row(params![dataset, key.source.as_str(), key.record_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()
        .map_err(to_storage_err)?;

    raw.map(|(disease, drug)| {
        Ok(FeatureSet {
            disease_cuis: decode_cuis(&disease)?,
            drug_cuis: decode_cuis(&drug)?,
        })
    })
    .transpose()
}

/// All record keys of a dataset in import order.
pub fn list_record_keys(conn: &Connection, dataset: &str) -> Result<Vec<RecordKey>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source, record_id FROM record_features WHERE dataset = ?1 ORDER BY rowid",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![dataset], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(to_storage_err)?;

    let mut keys = Vec::new();
    for row in rows {
        let (source, record_id) = row.map_err(to_storage_err)?;
        keys.push(RecordKey::new(parse_source(&source)?, record_id));
    }
    Ok(keys)
}

/// Every record of a dataset with its features, in import order.
pub fn load_dataset(
    conn: &Connection,
    dataset: &str,
) -> Result<Vec<(RecordKey, FeatureSet)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT source, record_id, disease_cuis, drug_cuis
             FROM record_features WHERE dataset = ?1 ORDER BY rowid",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map(params![dataset], raw_feature_row)
        .map_err(to_storage_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (source, record_id, disease, drug) = row.map_err(to_storage_err)?;
        out.push((
            RecordKey::new(parse_source(&source)?, record_id),
            FeatureSet {
                disease_cuis: decode_cuis(&disease)?,
                drug_cuis: decode_cuis(&drug)?,
            },
        ));
    }
    Ok(out)
}

/// Number of records stored for a dataset.
pub fn count_records(conn: &Connection, dataset: &str) -> Result<usize, StorageError> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM record_features WHERE dataset = ?1",
            params![dataset],
            |row| row.get(0),
        )
        .map_err(to_storage_err)?;
    Ok(n as usize)
}

/// `(dataset, record_count)` for every dataset, by name.
pub fn list_datasets(conn: &Connection) -> Result<Vec<(String, usize)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT dataset, COUNT(*) FROM record_features GROUP BY dataset ORDER BY dataset",
        )
        .map_err(to_storage_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))
        .map_err(to_storage_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
}

/// Remove a dataset's features. Returns the number of rows deleted.
pub fn delete_dataset(conn: &Connection, dataset: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM record_features WHERE dataset = ?1",
        params![dataset],
    )
    .map_err(to_storage_err)
}

fn raw_feature_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

pub(crate) fn parse_source(raw: &str) -> Result<Source, StorageError> {
    raw.parse().map_err(|e| StorageError::InvalidData {
        message: format!("{e}"),
    })
}

fn encode_cuis(cuis: &BTreeSet<String>) -> Result<String, StorageError> {
    serde_json::to_string(cuis).map_err(|e| StorageError::InvalidData {
        message: format!("encode CUI set: {e}"),
    })
}

fn decode_cuis(raw: &str) -> Result<BTreeSet<String>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::InvalidData {
        message: format!("decode CUI set {raw:?}: {e}"),
    })
}
