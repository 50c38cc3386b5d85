//! Validated distance threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::LINK_EPSILON;
use crate::errors::ConfigError;

/// A distance cutoff `d` in [0, 1]. Two records link iff `1 - similarity <= d`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(distance: f64) -> Result<Self, ConfigError> {
        if !distance.is_finite() || !(0.0..=1.0).contains(&distance) {
            return Err(ConfigError::ThresholdOutOfRange { value: distance });
        }
        Ok(Self(distance))
    }

    /// The distance cutoff.
    pub fn distance(&self) -> f64 {
        self.0
    }

    /// The equivalent minimum similarity, `1 - d`.
    pub fn min_similarity(&self) -> f64 {
        1.0 - self.0
    }

    /// Whether a pair with this similarity is linked.
    pub fn links(&self, similarity: f64) -> bool {
        1.0 - similarity <= self.0 + LINK_EPSILON
    }

    /// True when every non-negative similarity passes (`d = 1`). Pairs sharing
    /// no concept are then linked too, so candidate pruning does not apply.
    pub fn is_degenerate(&self) -> bool {
        self.links(0.0)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
