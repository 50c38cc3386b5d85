//! # cuigroup-core
//!
//! Foundation crate for the cuigroup record grouping engine.
//! Defines the record/feature data model, similarity metrics, errors,
//! configuration, and tracing setup. Every other crate in the workspace
//! depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::CuiGroupConfig;
pub use errors::{ConfigError, GroupingError, StorageError};
pub use traits::FeatureProvider;
pub use types::{
    FeatureSet, GroupingParams, GroupingPolicy, RecordKey, SimilarityMetric, Source, Threshold,
};
