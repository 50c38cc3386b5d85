//! Similarity metrics over binary concept vectors.
//!
//! Records are compared as sets of concept identifiers, which is the same as
//! comparing binary presence vectors over the observed vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Supported pairwise similarity metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// J(A, B) = |A ∩ B| / |A ∪ B|
    Jaccard,
    /// cos(A, B) = |A ∩ B| / sqrt(|A| · |B|)
    Cosine,
}

impl SimilarityMetric {
    pub const ALL: [SimilarityMetric; 2] = [SimilarityMetric::Jaccard, SimilarityMetric::Cosine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jaccard => "jaccard",
            Self::Cosine => "cosine",
        }
    }

    /// Similarity of two strictly ascending, duplicate-free slices.
    ///
    /// Returns 0.0 when either side is empty, so featureless records never
    /// score as identical.
    pub fn score_sorted<T: Ord>(&self, a: &[T], b: &[T]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let shared = intersection_len(a, b);
        self.score_counts(shared, a.len(), b.len())
    }

    /// Similarity from set cardinalities: `shared = |A ∩ B|`.
    pub fn score_counts(&self, shared: usize, len_a: usize, len_b: usize) -> f64 {
        if len_a == 0 || len_b == 0 {
            return 0.0;
        }
        let score = match self {
            Self::Jaccard => {
                let union = len_a + len_b - shared;
                shared as f64 / union as f64
            }
            Self::Cosine => shared as f64 / ((len_a as f64) * (len_b as f64)).sqrt(),
        };
        score.clamp(0.0, 1.0)
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jaccard" => Ok(Self::Jaccard),
            "cosine" => Ok(Self::Cosine),
            _ => Err(ConfigError::UnknownMetric {
                name: s.to_string(),
            }),
        }
    }
}

/// |A ∩ B| for two ascending slices, by linear merge.
pub fn intersection_len<T: Ord>(a: &[T], b: &[T]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}
