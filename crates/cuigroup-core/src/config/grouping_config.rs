//! Grouping configuration.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;
use crate::types::GroupingParams;

/// Configuration for a grouping run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GroupingConfig {
    /// Dataset whose features are grouped. Default: "sample_data".
    pub dataset: Option<String>,
    /// Similarity metric name ("cosine" | "jaccard"). Default: "cosine".
    pub metric: Option<String>,
    /// Distance threshold in [0, 1]. Default: 0.4.
    pub distance_threshold: Option<f64>,
    /// Grouping policy ("combined" | "conjunctive"). Default: "conjunctive".
    pub policy: Option<String>,
    /// Parallel candidate scoring. Default: true.
    pub parallel: Option<bool>,
}

impl GroupingConfig {
    pub fn effective_dataset(&self) -> &str {
        self.dataset.as_deref().unwrap_or(constants::DEFAULT_DATASET)
    }

    pub fn effective_metric(&self) -> &str {
        self.metric.as_deref().unwrap_or(constants::DEFAULT_METRIC)
    }

    pub fn effective_distance_threshold(&self) -> f64 {
        self.distance_threshold
            .unwrap_or(constants::DEFAULT_DISTANCE_THRESHOLD)
    }

    pub fn effective_policy(&self) -> &str {
        self.policy.as_deref().unwrap_or(constants::DEFAULT_POLICY)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Resolve into typed parameters. Unknown names fail here, not mid-run.
    pub fn params(&self) -> Result<GroupingParams, ConfigError> {
        Ok(GroupingParams::parse(
            self.effective_dataset(),
            self.effective_metric(),
            self.effective_distance_threshold(),
            self.effective_policy(),
        )?
        .with_parallel(self.effective_parallel()))
    }
}
