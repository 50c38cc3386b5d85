//! FeatureProvider backed by the record_features table.

use cuigroup_core::errors::{GroupingError, GroupingResultExt};
use cuigroup_core::traits::FeatureProvider;
use cuigroup_core::types::collections::FxHashMap;
use cuigroup_core::types::{FeatureSet, RecordKey};

use crate::connection::DatabaseManager;
use crate::queries::features;

/// Read-only view of one dataset's stored features.
pub struct SqliteFeatureProvider<'a> {
    db: &'a DatabaseManager,
    dataset: String,
}

impl<'a> SqliteFeatureProvider<'a> {
    pub fn new(db: &'a DatabaseManager, dataset: impl Into<String>) -> Self {
        Self {
            db,
            dataset: dataset.into(),
        }
    }

    /// Number of stored records of the dataset.
    pub fn record_count(&self) -> Result<usize, GroupingError> {
        self.db
            .with_conn(|conn| features::count_records(conn, &self.dataset))
            .provider_err()
    }
}

impl FeatureProvider for SqliteFeatureProvider<'_> {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn record_keys(&self) -> Result<Vec<RecordKey>, GroupingError> {
        self.db
            .with_conn(|conn| features::list_record_keys(conn, &self.dataset))
            .provider_err()
    }

    fn fetch(&self, key: &RecordKey) -> Result<Option<FeatureSet>, GroupingError> {
        self.db
            .with_conn(|conn| features::get_features(conn, &self.dataset, key))
            .provider_err()
    }

    /// One scan of the dataset instead of a query per key.
    fn fetch_many(&self, keys: &[RecordKey]) -> Result<Vec<Option<FeatureSet>>, GroupingError> {
        let all: FxHashMap<RecordKey, FeatureSet> = self
            .db
            .with_conn(|conn| features::load_dataset(conn, &self.dataset))
            .provider_err()?
            .into_iter()
            .collect();
        Ok(keys.iter().map(|k| all.get(k).cloned()).collect())
    }
}
