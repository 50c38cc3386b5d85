//! Typed, validated parameters of one grouping run.

use serde::{Deserialize, Serialize};

use super::{GroupingPolicy, SimilarityMetric, Threshold};
use crate::errors::ConfigError;

/// Everything a grouping run needs besides the features themselves.
/// `(dataset, metric, threshold)` is the identity of the produced result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingParams {
    pub dataset: String,
    pub metric: SimilarityMetric,
    pub threshold: Threshold,
    pub policy: GroupingPolicy,
    /// Score candidate pairs on the rayon pool for large inputs.
    pub parallel: bool,
}

impl GroupingParams {
    pub fn new(
        dataset: impl Into<String>,
        metric: SimilarityMetric,
        threshold: Threshold,
        policy: GroupingPolicy,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            metric,
            threshold,
            policy,
            parallel: true,
        }
    }

    /// Build parameters from raw strings, rejecting unknown values up front.
    pub fn parse(
        dataset: &str,
        metric: &str,
        distance_threshold: f64,
        policy: &str,
    ) -> Result<Self, ConfigError> {
        if dataset.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "grouping.dataset".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(Self::new(
            dataset,
            metric.parse()?,
            Threshold::new(distance_threshold)?,
            policy.parse()?,
        ))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
