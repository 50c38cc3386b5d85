//! Saved grouping results: save, load, list, delete.

use std::time::{SystemTime, UNIX_EPOCH};

use cuigroup_core::errors::StorageError;
use cuigroup_core::types::collections::BTreeSet;
use cuigroup_core::types::{GroupingPolicy, RecordKey, SimilarityMetric, Threshold};
use cuigroup_grouping::{GroupingResult, GroupingTag};
use tracing::{debug, info};

use crate::connection::DatabaseManager;
use crate::queries::groupings::{self, GroupingRow};

/// Header of a saved grouping, as returned by [`GroupingStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGrouping {
    pub tag: GroupingTag,
    pub policy: GroupingPolicy,
    pub record_count: usize,
    pub supergroup_count: usize,
    /// Unix seconds.
    pub saved_at: i64,
}

/// Persists grouping results keyed by `(dataset, metric, threshold)`.
pub struct GroupingStore<'a> {
    db: &'a DatabaseManager,
}

impl<'a> GroupingStore<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self { db }
    }

    /// Save a result. An existing result with the same tag is replaced.
    pub fn save(&self, result: &GroupingResult) -> Result<(), StorageError> {
        let tag = result.tag();
        let metric = tag.metric.as_str();
        let threshold = tag.threshold.distance();
        let header = GroupingRow {
            dataset: tag.dataset.clone(),
            metric: metric.to_string(),
            threshold,
            policy: result.policy().as_str().to_string(),
            record_count: result.record_count() as i64,
            supergroup_count: result.supergroup_count() as i64,
            fingerprint: result.fingerprint(),
            saved_at: unix_now(),
        };

        let replaced = self.db.with_transaction(|conn| {
            let replaced = groupings::delete_grouping(conn, &tag.dataset, metric, threshold)?;
            groupings::insert_grouping(conn, &header)?;
            for (index, members) in result.iter() {
                groupings::insert_members(conn, &tag.dataset, metric, threshold, index, members)?;
            }
            Ok(replaced)
        })?;

        info!(
            tag = %tag,
            supergroups = header.supergroup_count,
            records = header.record_count,
            replaced,
            "grouping saved"
        );
        Ok(())
    }

    /// Load the result saved under `tag`.
    pub fn load(&self, tag: &GroupingTag) -> Result<GroupingResult, StorageError> {
        let metric = tag.metric.as_str();
        let threshold = tag.threshold.distance();

        let (header, members) = self.db.with_conn(|conn| {
            let header = groupings::get_grouping(conn, &tag.dataset, metric, threshold)?;
            match header {
                Some(h) => {
                    let members = groupings::get_members(conn, &tag.dataset, metric, threshold)?;
                    Ok((h, members))
                }
                None => Err(StorageError::GroupingNotFound {
                    tag: tag.to_string(),
                }),
            }
        })?;

        let result = assemble(tag, &header, members)?;
        debug!(tag = %tag, supergroups = result.supergroup_count(), "grouping loaded");
        Ok(result)
    }

    /// Whether a result is saved under `tag`.
    pub fn exists(&self, tag: &GroupingTag) -> Result<bool, StorageError> {
        self.db.with_conn(|conn| {
            Ok(groupings::get_grouping(conn, &tag.dataset, tag.metric.as_str(), tag.threshold.distance())?
                .is_some())
        })
    }

    /// Saved grouping headers, optionally for one dataset, sorted by tag.
    pub fn list(&self, dataset: Option<&str>) -> Result<Vec<SavedGrouping>, StorageError> {
        let rows = self.db.with_conn(|conn| groupings::list_groupings(conn, dataset))?;
        rows.iter()
            .map(|row| {
                Ok(SavedGrouping {
                    tag: parse_tag(row)?,
                    policy: parse_policy(&row.policy)?,
                    record_count: row.record_count as usize,
                    supergroup_count: row.supergroup_count as usize,
                    saved_at: row.saved_at,
                })
            })
            .collect()
    }

    /// Delete the result saved under `tag`. Returns whether it existed.
    pub fn delete(&self, tag: &GroupingTag) -> Result<bool, StorageError> {
        self.db.with_transaction(|conn| {
            groupings::delete_grouping(conn, &tag.dataset, tag.metric.as_str(), tag.threshold.distance())
        })
    }
}

/// Rebuild a result from stored rows, checking it against its header.
fn assemble(
    tag: &GroupingTag,
    header: &GroupingRow,
    members: Vec<(usize, RecordKey)>,
) -> Result<GroupingResult, StorageError> {
    let count = usize::try_from(header.supergroup_count).map_err(|_| corrupt(tag, "negative supergroup count"))?;
    let mut supergroups: Vec<BTreeSet<RecordKey>> = vec![BTreeSet::new(); count];
    let mut member_rows = 0usize;
    for (index, key) in members {
        let group = supergroups
            .get_mut(index)
            .ok_or_else(|| corrupt(tag, &format!("member in supergroup {index} of {count}")))?;
        group.insert(key);
        member_rows += 1;
    }
    if member_rows as i64 != header.record_count {
        return Err(corrupt(
            tag,
            &format!("{member_rows} members stored, header says {}", header.record_count),
        ));
    }

    let policy = parse_policy(&header.policy)?;
    let result = GroupingResult::new(tag.clone(), policy, supergroups)
        .map_err(|e| corrupt(tag, &e.to_string()))?;

    if result.fingerprint() != header.fingerprint {
        return Err(corrupt(tag, "partition fingerprint mismatch"));
    }
    Ok(result)
}

fn corrupt(tag: &GroupingTag, details: &str) -> StorageError {
    StorageError::CorruptionDetected {
        details: format!("grouping {tag}: {details}"),
    }
}

fn parse_tag(row: &GroupingRow) -> Result<GroupingTag, StorageError> {
    let metric: SimilarityMetric = row.metric.parse().map_err(invalid)?;
    let threshold = Threshold::new(row.threshold).map_err(invalid)?;
    Ok(GroupingTag::new(row.dataset.clone(), metric, threshold))
}

fn parse_policy(raw: &str) -> Result<GroupingPolicy, StorageError> {
    raw.parse().map_err(invalid)
}

fn invalid(e: impl std::fmt::Display) -> StorageError {
    StorageError::InvalidData {
        message: e.to_string(),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
