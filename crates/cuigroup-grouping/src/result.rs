//! Immutable grouping results and their queries.

use std::fmt;

use cuigroup_core::errors::{ConfigError, GroupingError};
use cuigroup_core::types::collections::{BTreeSet, FxHashMap};
use cuigroup_core::types::{GroupingParams, GroupingPolicy, RecordKey, SimilarityMetric, Threshold};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::index::FeatureIndex;
use crate::resolver::Resolution;

/// Identity of a grouping result: `(dataset, metric, threshold)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingTag {
    pub dataset: String,
    pub metric: SimilarityMetric,
    pub threshold: Threshold,
}

impl GroupingTag {
    pub fn new(dataset: impl Into<String>, metric: SimilarityMetric, threshold: Threshold) -> Self {
        Self {
            dataset: dataset.into(),
            metric,
            threshold,
        }
    }

    pub fn from_params(params: &GroupingParams) -> Self {
        Self::new(params.dataset.clone(), params.metric, params.threshold)
    }
}

impl fmt::Display for GroupingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.dataset, self.metric, self.threshold)
    }
}

/// Supergroups of one dataset under one metric and threshold.
///
/// Every record of the grouped universe is in exactly one supergroup;
/// supergroup indices are stable for the lifetime of the result.
#[derive(Debug, Clone)]
pub struct GroupingResult {
    tag: GroupingTag,
    policy: GroupingPolicy,
    supergroups: Vec<BTreeSet<RecordKey>>,
    membership: FxHashMap<RecordKey, usize>,
}

impl GroupingResult {
    /// Assemble a result from explicit supergroups.
    ///
    /// Fails if a record appears in two supergroups or a supergroup is empty.
    pub fn new(
        tag: GroupingTag,
        policy: GroupingPolicy,
        supergroups: Vec<BTreeSet<RecordKey>>,
    ) -> Result<Self, GroupingError> {
        let mut membership = FxHashMap::default();
        for (index, members) in supergroups.iter().enumerate() {
            if members.is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "supergroups".to_string(),
                    message: format!("supergroup {index} is empty"),
                }
                .into());
            }
            for key in members {
                if membership.insert(key.clone(), index).is_some() {
                    return Err(GroupingError::DuplicateRecord { key: key.clone() });
                }
            }
        }
        Ok(Self {
            tag,
            policy,
            supergroups,
            membership,
        })
    }

    /// Map a resolution's slot partition back to record keys.
    pub fn from_resolution(
        tag: GroupingTag,
        resolution: &Resolution,
        index: &FeatureIndex,
    ) -> Result<Self, GroupingError> {
        let supergroups = resolution
            .supergroups
            .cells()
            .iter()
            .map(|cell| cell.iter().map(|&slot| index.key(slot as usize).clone()).collect())
            .collect();
        Self::new(tag, resolution.policy, supergroups)
    }

    pub fn tag(&self) -> &GroupingTag {
        &self.tag
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    pub fn supergroups(&self) -> &[BTreeSet<RecordKey>] {
        &self.supergroups
    }

    pub fn supergroup_count(&self) -> usize {
        self.supergroups.len()
    }

    pub fn record_count(&self) -> usize {
        self.membership.len()
    }

    /// Members of supergroup `index`.
    pub fn records_in_group(&self, index: usize) -> Result<&BTreeSet<RecordKey>, GroupingError> {
        self.supergroups
            .get(index)
            .ok_or(GroupingError::SupergroupNotFound {
                index,
                count: self.supergroups.len(),
            })
    }

    /// Union of several supergroups.
    pub fn records_in_groups(&self, indices: &[usize]) -> Result<BTreeSet<RecordKey>, GroupingError> {
        let mut out = BTreeSet::new();
        for &index in indices {
            out.extend(self.records_in_group(index)?.iter().cloned());
        }
        Ok(out)
    }

    /// `(index, size)` for every supergroup, largest first; equal sizes keep
    /// ascending index order.
    pub fn group_sizes(&self) -> Vec<(usize, usize)> {
        let mut sizes: Vec<(usize, usize)> =
            self.supergroups.iter().map(BTreeSet::len).enumerate().collect();
        sizes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        sizes
    }

    /// Supergroup holding `key`, if the record was grouped.
    pub fn supergroup_of(&self, key: &RecordKey) -> Option<usize> {
        self.membership.get(key).copied()
    }

    /// Records that share a supergroup with at least one other record.
    pub fn grouped_records(&self) -> BTreeSet<RecordKey> {
        self.supergroups
            .iter()
            .filter(|g| g.len() > 1)
            .flat_map(|g| g.iter().cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<RecordKey>)> {
        self.supergroups.iter().enumerate()
    }

    /// xxh3 digest of the partition in supergroup order.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for members in &self.supergroups {
            hasher.update(&(members.len() as u64).to_le_bytes());
            for key in members {
                hasher.update(key.source.as_str().as_bytes());
                hasher.update(&[0]);
                hasher.update(key.record_id.as_bytes());
                hasher.update(&[0]);
            }
        }
        hasher.digest()
    }
}

impl PartialEq for GroupingResult {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.policy == other.policy && self.supergroups == other.supergroups
    }
}
