//! Pairwise record similarity over concept identifier sets.
//!
//! `similarity` compares two records on the union of their disease and drug
//! concepts. `channel_similarity` scores one channel of an indexed pair; the
//! exhaustive graph construction links pairs with it, while the pruned builder
//! scores from shared-concept counts.

use cuigroup_core::types::{FeatureSet, SimilarityMetric};

use crate::index::{Channel, FeatureIndex};

/// Similarity of two records over their combined disease and drug concepts.
///
/// A concept listed as both a disease and a drug of one record counts once.
/// Returns 0.0 if either record is featureless.
pub fn similarity(a: &FeatureSet, b: &FeatureSet, metric: SimilarityMetric) -> f64 {
    feature_similarity(a, b, Channel::Combined, metric)
}

/// Similarity of two records restricted to one channel.
pub fn feature_similarity(
    a: &FeatureSet,
    b: &FeatureSet,
    channel: Channel,
    metric: SimilarityMetric,
) -> f64 {
    match channel {
        Channel::Combined => {
            let a: Vec<&str> = a.combined().into_iter().collect();
            let b: Vec<&str> = b.combined().into_iter().collect();
            metric.score_sorted(&a, &b)
        }
        Channel::Disease => {
            let a: Vec<&String> = a.disease_cuis.iter().collect();
            let b: Vec<&String> = b.disease_cuis.iter().collect();
            metric.score_sorted(&a, &b)
        }
        Channel::Drug => {
            let a: Vec<&String> = a.drug_cuis.iter().collect();
            let b: Vec<&String> = b.drug_cuis.iter().collect();
            metric.score_sorted(&a, &b)
        }
    }
}

/// Similarity of two indexed records on one channel.
pub fn channel_similarity(
    index: &FeatureIndex,
    channel: Channel,
    metric: SimilarityMetric,
    a: usize,
    b: usize,
) -> f64 {
    metric.score_sorted(index.concepts(channel, a), index.concepts(channel, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuigroup_core::types::{RecordKey, Source};

    fn set(d: &[&str], r: &[&str]) -> FeatureSet {
        FeatureSet::new(d.iter().copied(), r.iter().copied())
    }

    #[test]
    fn combined_jaccard() {
        // {C1, C2} vs {C1, C3}: 1 shared of 3
        let a = set(&["C1"], &["C2"]);
        let b = set(&["C1"], &["C3"]);
        let sim = similarity(&a, &b, SimilarityMetric::Jaccard);
        assert!((sim - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn concept_in_both_channels_counts_once() {
        let a = set(&["C1"], &["C1"]);
        let b = set(&["C1"], &[]);
        assert_eq!(similarity(&a, &b, SimilarityMetric::Jaccard), 1.0);
        assert_eq!(similarity(&a, &b, SimilarityMetric::Cosine), 1.0);
    }

    #[test]
    fn featureless_pair_scores_zero() {
        let empty = FeatureSet::default();
        for metric in SimilarityMetric::ALL {
            assert_eq!(similarity(&empty, &empty, metric), 0.0);
            assert_eq!(similarity(&empty, &set(&["C1"], &[]), metric), 0.0);
        }
    }

    #[test]
    fn reflexive_for_non_empty() {
        let a = set(&["C1", "C2"], &["C9"]);
        for metric in SimilarityMetric::ALL {
            assert!((similarity(&a, &a, metric) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn channel_scores_ignore_the_other_channel() {
        let a = set(&["C1"], &["C2"]);
        let b = set(&["C1"], &["C3"]);
        let m = SimilarityMetric::Cosine;
        assert_eq!(feature_similarity(&a, &b, Channel::Disease, m), 1.0);
        assert_eq!(feature_similarity(&a, &b, Channel::Drug, m), 0.0);
    }

    #[test]
    fn indexed_scores_match_feature_scores() {
        let a = set(&["C1", "C4"], &["C2"]);
        let b = set(&["C1"], &["C2", "C3"]);
        let index = FeatureIndex::from_records(
            "t",
            vec![
                (RecordKey::new(Source::Pubmed, "1"), a.clone()),
                (RecordKey::new(Source::Ema, "2"), b.clone()),
            ],
        )
        .unwrap();
        for metric in SimilarityMetric::ALL {
            for channel in [Channel::Combined, Channel::Disease, Channel::Drug] {
                let direct = feature_similarity(&a, &b, channel, metric);
                let indexed = channel_similarity(&index, channel, metric, 0, 1);
                assert!((direct - indexed).abs() < 1e-12, "{metric} {channel:?}");
            }
        }
    }
}
