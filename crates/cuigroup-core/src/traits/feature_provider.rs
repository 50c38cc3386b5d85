//! FeatureProvider trait: read-only access to one dataset's features.

use crate::errors::GroupingError;
use crate::types::{FeatureSet, RecordKey};

/// Supplies the per-record concept features of a single dataset.
///
/// Implementations are treated as read-only for the whole grouping run.
pub trait FeatureProvider {
    /// Name of the dataset these features belong to.
    fn dataset(&self) -> &str;

    /// All record keys of the dataset, in a stable order.
    fn record_keys(&self) -> Result<Vec<RecordKey>, GroupingError>;

    /// Features of one record, or `None` if the record is unknown.
    fn fetch(&self, key: &RecordKey) -> Result<Option<FeatureSet>, GroupingError>;

    /// Features of many records. Missing records yield `None` in place.
    ///
    /// The default calls [`fetch`](Self::fetch) per key; backends with a
    /// cheaper bulk path should override it.
    fn fetch_many(&self, keys: &[RecordKey]) -> Result<Vec<Option<FeatureSet>>, GroupingError> {
        keys.iter().map(|k| self.fetch(k)).collect()
    }
}
