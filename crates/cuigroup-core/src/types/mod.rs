//! Core data model: records, features, metrics, thresholds, policies.

pub mod collections;
pub mod metric;
pub mod params;
pub mod policy;
pub mod record;
pub mod threshold;

pub use metric::SimilarityMetric;
pub use params::GroupingParams;
pub use policy::GroupingPolicy;
pub use record::{FeatureSet, RecordKey, Source};
pub use threshold::Threshold;
