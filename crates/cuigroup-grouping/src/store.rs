//! In-memory feature store.

use cuigroup_core::errors::GroupingError;
use cuigroup_core::traits::FeatureProvider;
use cuigroup_core::types::collections::FxHashMap;
use cuigroup_core::types::{FeatureSet, RecordKey};

/// Per-record features of one dataset, held in memory.
///
/// Keys keep their insertion order, which is the order records enter the
/// grouping arena.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    dataset: String,
    keys: Vec<RecordKey>,
    features: FxHashMap<RecordKey, FeatureSet>,
}

impl FeatureStore {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            keys: Vec::new(),
            features: FxHashMap::default(),
        }
    }

    /// Add one record. A key may map to at most one feature set.
    pub fn insert(&mut self, key: RecordKey, features: FeatureSet) -> Result<(), GroupingError> {
        if self.features.contains_key(&key) {
            return Err(GroupingError::DuplicateRecord { key });
        }
        self.keys.push(key.clone());
        self.features.insert(key, features);
        Ok(())
    }

    pub fn get(&self, key: &RecordKey) -> Option<&FeatureSet> {
        self.features.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Records with both concept sets empty.
    pub fn featureless_count(&self) -> usize {
        self.features.values().filter(|f| f.is_featureless()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &FeatureSet)> {
        self.keys.iter().filter_map(|k| self.features.get(k).map(|f| (k, f)))
    }
}

impl FeatureProvider for FeatureStore {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn record_keys(&self) -> Result<Vec<RecordKey>, GroupingError> {
        Ok(self.keys.clone())
    }

    fn fetch(&self, key: &RecordKey) -> Result<Option<FeatureSet>, GroupingError> {
        Ok(self.features.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuigroup_core::types::Source;

    #[test]
    fn rejects_duplicate_keys() {
        let mut store = FeatureStore::new("t");
        let key = RecordKey::new(Source::Ctgov, "NCT01");
        store.insert(key.clone(), FeatureSet::default()).unwrap();
        let err = store.insert(key, FeatureSet::default()).unwrap_err();
        assert!(matches!(err, GroupingError::DuplicateRecord { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut store = FeatureStore::new("t");
        for id in ["c", "a", "b"] {
            store
                .insert(RecordKey::new(Source::Pubmed, id), FeatureSet::new(["C1"], ["C2"]))
                .unwrap();
        }
        let ids: Vec<_> = store.record_keys().unwrap().into_iter().map(|k| k.record_id).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn counts_featureless_records() {
        let mut store = FeatureStore::new("t");
        store.insert(RecordKey::new(Source::Ema, "1"), FeatureSet::default()).unwrap();
        store
            .insert(RecordKey::new(Source::Ema, "2"), FeatureSet::new(["C1"], Vec::<String>::new()))
            .unwrap();
        assert_eq!(store.featureless_count(), 1);
    }
}
