//! Integration tests for cuigroup-grouping: end-to-end scenarios through the
//! pipeline.

use cuigroup_core::errors::GroupingError;
use cuigroup_core::types::{
    FeatureSet, GroupingParams, GroupingPolicy, RecordKey, SimilarityMetric, Source, Threshold,
};
use cuigroup_grouping::{Channel, FeatureStore, GroupingPipeline, GroupingResult};

const NEOPLASM: &str = "C0029456";
const DRUG: &str = "C4042342";

fn key(id: &str) -> RecordKey {
    RecordKey::new(Source::Ctgov, id)
}

/// Two records with the same disease and drug, and a third with the same
/// disease and no drug.
fn three_record_store() -> FeatureStore {
    let mut store = FeatureStore::new("sample_data");
    store.insert(key("NCT01"), FeatureSet::new([NEOPLASM], [DRUG])).unwrap();
    store.insert(key("NCT02"), FeatureSet::new([NEOPLASM], [DRUG])).unwrap();
    store
        .insert(key("NCT03"), FeatureSet::new([NEOPLASM], Vec::<String>::new()))
        .unwrap();
    store
}

fn run(
    store: &FeatureStore,
    metric: SimilarityMetric,
    d: f64,
    policy: GroupingPolicy,
) -> GroupingResult {
    let params = GroupingParams::new("sample_data", metric, Threshold::new(d).unwrap(), policy);
    GroupingPipeline::new(params).run(store).unwrap().result
}

#[test]
fn third_record_stays_apart_under_conjunctive_policy() {
    let store = three_record_store();
    for metric in SimilarityMetric::ALL {
        let result = run(&store, metric, 0.4, GroupingPolicy::Conjunctive);
        let first = result.supergroup_of(&key("NCT01")).unwrap();
        assert_eq!(result.supergroup_of(&key("NCT02")), Some(first));
        assert_ne!(result.supergroup_of(&key("NCT03")), Some(first), "{metric}");
        assert_eq!(result.supergroup_count(), 2);
    }
}

#[test]
fn third_record_joins_under_combined_cosine() {
    // cos = 1/sqrt(2), distance ≈ 0.293
    let result = run(&three_record_store(), SimilarityMetric::Cosine, 0.4, GroupingPolicy::Combined);
    assert_eq!(result.supergroup_count(), 1);
    assert_eq!(result.records_in_group(0).unwrap().len(), 3);
}

/// The disease-only record shares one of two concepts with the pair, so its
/// combined Jaccard distance is exactly 0.5. A join at d = 0.4 is unreachable
/// under that formula; staying apart there is the expected outcome.
#[test]
fn combined_jaccard_join_depends_on_threshold() {
    let store = three_record_store();
    let strict = run(&store, SimilarityMetric::Jaccard, 0.4, GroupingPolicy::Combined);
    assert_eq!(strict.supergroup_count(), 2);

    let loose = run(&store, SimilarityMetric::Jaccard, 0.5, GroupingPolicy::Combined);
    assert_eq!(loose.supergroup_count(), 1);
    assert_eq!(loose.grouped_records().len(), 3);
}

#[test]
fn featureless_record_is_always_a_singleton() {
    let mut store = three_record_store();
    store.insert(key("NCT04"), FeatureSet::default()).unwrap();

    for metric in SimilarityMetric::ALL {
        for policy in [GroupingPolicy::Combined, GroupingPolicy::Conjunctive] {
            for d in [0.0, 0.4, 0.99, 1.0] {
                let result = run(&store, metric, d, policy);
                let index = result.supergroup_of(&key("NCT04")).unwrap();
                let members = result.records_in_group(index).unwrap();
                assert_eq!(members.len(), 1, "{metric} {policy} d={d}");
                assert!(!result.grouped_records().contains(&key("NCT04")));
            }
        }
    }
}

#[test]
fn every_record_lands_in_exactly_one_supergroup() {
    let store = three_record_store();
    let result = run(&store, SimilarityMetric::Cosine, 0.4, GroupingPolicy::Combined);
    let total: usize = result.iter().map(|(_, members)| members.len()).sum();
    assert_eq!(total, store.len());
    assert_eq!(result.record_count(), store.len());
}

#[test]
fn group_sizes_order_ties_by_index() {
    let mut store = FeatureStore::new("ties");
    for (id, d, r) in [
        ("NCT10", "C1", "D1"),
        ("NCT11", "C9", "D9"),
        ("NCT12", "C1", "D1"),
        ("NCT13", "C9", "D9"),
        ("NCT14", "C5", "D5"),
    ] {
        store.insert(key(id), FeatureSet::new([d], [r])).unwrap();
    }
    let params = GroupingParams::new(
        "ties",
        SimilarityMetric::Jaccard,
        Threshold::new(0.0).unwrap(),
        GroupingPolicy::Conjunctive,
    );
    let result = GroupingPipeline::new(params).run(&store).unwrap().result;
    assert_eq!(result.group_sizes(), vec![(0, 2), (1, 2), (2, 1)]);
}

#[test]
fn out_of_range_group_is_not_found() {
    let result = run(&three_record_store(), SimilarityMetric::Cosine, 0.4, GroupingPolicy::Combined);
    let err = result.records_in_group(5).unwrap_err();
    assert!(matches!(err, GroupingError::SupergroupNotFound { index: 5, count: 1 }));
    assert!(err.is_not_found());
}

#[test]
fn missing_universe_record_aborts_the_run() {
    let store = three_record_store();
    let params = GroupingParams::new(
        "sample_data",
        SimilarityMetric::Cosine,
        Threshold::new(0.4).unwrap(),
        GroupingPolicy::Combined,
    );
    let err = GroupingPipeline::new(params)
        .run_for(&store, &[key("NCT01"), RecordKey::new(Source::Pubmed, "999")])
        .unwrap_err();
    assert!(matches!(err, GroupingError::MissingRecord { .. }));
}

#[test]
fn conjunctive_diagnostics_report_both_channels() {
    let store = three_record_store();
    let params = GroupingParams::new(
        "sample_data",
        SimilarityMetric::Jaccard,
        Threshold::new(0.4).unwrap(),
        GroupingPolicy::Conjunctive,
    );
    let run = GroupingPipeline::new(params).run(&store).unwrap();
    // All three share the disease; only two have a drug.
    assert_eq!(run.diagnostics.base_group_count(Channel::Disease), Some(1));
    assert_eq!(run.diagnostics.base_group_count(Channel::Drug), Some(2));
    assert_eq!(run.diagnostics.supergroup_count, 2);
}
