//! Integration tests for cuigroup-storage: import, feature provider, and
//! grouping persistence on file-backed databases.

use std::fs;
use std::path::Path;

use cuigroup_core::errors::{GroupingError, StorageError};
use cuigroup_core::traits::FeatureProvider;
use cuigroup_core::types::{
    GroupingParams, GroupingPolicy, RecordKey, SimilarityMetric, Source, Threshold,
};
use cuigroup_grouping::{GroupingPipeline, GroupingResult, GroupingTag};
use cuigroup_storage::connection::pragmas::foreign_keys_enabled;
use cuigroup_storage::migrations::LATEST_VERSION;
use cuigroup_storage::{
    import_batch_dir, import_batch_file, DatabaseManager, GroupingStore, SqliteFeatureProvider,
};

const CTGOV_BATCH: &str = r#"{"source": "ctgov", "record_id": "NCT01", "disease_cuis": ["C0029456"], "drug_cuis": ["C4042342"]}
{"source": "ctgov", "record_id": "NCT02", "disease_cuis": ["C0029456"], "drug_cuis": ["C4042342"]}

{"source": "ctgov", "record_id": "NCT03", "disease_cuis": ["C0029456"], "drug_cuis": null}
"#;

const PUBMED_BATCH: &str = r#"{"source": "pubmed", "record_id": 31234567, "disease_cuis": null, "drug_cuis": null}
{"source": "pubmed", "record_id": "29000001", "disease_cuis": ["C0011849"], "drug_cuis": ["C0025598"]}
"#;

fn write_batches(dir: &Path) {
    fs::write(dir.join("ctgov_0.jsonl"), CTGOV_BATCH).unwrap();
    fs::write(dir.join("pubmed_0.jsonl"), PUBMED_BATCH).unwrap();
    fs::write(dir.join("README.txt"), "not a batch").unwrap();
}

fn open(dir: &Path) -> DatabaseManager {
    DatabaseManager::open(&dir.join("cuigroup.db")).unwrap()
}

fn params(metric: SimilarityMetric, d: f64, policy: GroupingPolicy) -> GroupingParams {
    GroupingParams::new("sample_data", metric, Threshold::new(d).unwrap(), policy)
}

fn grouped(db: &DatabaseManager, metric: SimilarityMetric, d: f64) -> GroupingResult {
    let provider = SqliteFeatureProvider::new(db, "sample_data");
    GroupingPipeline::new(params(metric, d, GroupingPolicy::Conjunctive))
        .run(&provider)
        .unwrap()
        .result
}

// ── Schema ────────────────────────────────────────────────────────────────

#[test]
fn test_open_applies_migrations_and_pragmas() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(dir.path());
    assert_eq!(db.schema_version().unwrap(), LATEST_VERSION);
    assert!(db.with_conn(foreign_keys_enabled).unwrap());
    assert_eq!(db.path(), Some(dir.path().join("cuigroup.db").as_path()));

    // Reopening an existing database is a no-op migration.
    drop(db);
    let db = open(dir.path());
    assert_eq!(db.schema_version().unwrap(), LATEST_VERSION);
}

// ── Import ────────────────────────────────────────────────────────────────

#[test]
fn test_import_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());

    let report = import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.records, 5);
    assert_eq!(report.featureless, 1);
    assert_eq!(report.duplicates, 0);

    let provider = SqliteFeatureProvider::new(&db, "sample_data");
    assert_eq!(provider.record_count().unwrap(), 5);
    let keys = provider.record_keys().unwrap();
    // File order, then line order.
    assert_eq!(keys[0], RecordKey::new(Source::Ctgov, "NCT01"));
    assert_eq!(keys[3], RecordKey::new(Source::Pubmed, "31234567"));

    let nct03 = provider
        .fetch(&RecordKey::new(Source::Ctgov, "NCT03"))
        .unwrap()
        .unwrap();
    assert_eq!(nct03.disease_cuis.len(), 1);
    assert!(nct03.drug_cuis.is_empty());
    assert!(provider
        .fetch(&RecordKey::new(Source::Ema, "missing"))
        .unwrap()
        .is_none());
}

#[test]
fn test_reimport_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    let provider = SqliteFeatureProvider::new(&db, "sample_data");
    assert_eq!(provider.record_keys().unwrap().len(), 5);
}

#[test]
fn test_duplicate_line_keeps_the_later_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.jsonl");
    fs::write(
        &path,
        r#"{"source": "ema", "record_id": "E1", "disease_cuis": ["C1"]}
{"source": "ema", "record_id": "E1", "disease_cuis": [], "drug_cuis": []}
"#,
    )
    .unwrap();
    let db = open(dir.path());
    let report = import_batch_file(&db, "d", &path).unwrap();
    assert_eq!(report.records, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.featureless, 1);

    let provider = SqliteFeatureProvider::new(&db, "d");
    let f = provider.fetch(&RecordKey::new(Source::Ema, "E1")).unwrap().unwrap();
    assert!(f.is_featureless());
}

#[test]
fn test_bad_line_aborts_whole_import() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.jsonl"), CTGOV_BATCH).unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"source\": \"ctgov\", \"record_id\": \"NCT09\"}\n{not json\n",
    )
    .unwrap();
    let db = open(dir.path());

    match import_batch_dir(&db, "sample_data", dir.path()) {
        Err(StorageError::ImportFailed { path, message }) => {
            assert!(path.ends_with("b.jsonl"), "{path}");
            assert!(message.starts_with("line 2"), "{message}");
        }
        other => panic!("expected ImportFailed, got {other:?}"),
    }
    let provider = SqliteFeatureProvider::new(&db, "sample_data");
    assert!(provider.record_keys().unwrap().is_empty());
}

#[test]
fn test_missing_directory_is_import_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(dir.path());
    let err = import_batch_dir(&db, "d", &dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, StorageError::ImportFailed { .. }));
}

// ── Grouping over stored features ─────────────────────────────────────────

#[test]
fn test_grouping_from_sqlite_provider() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();

    let result = grouped(&db, SimilarityMetric::Cosine, 0.4);
    assert_eq!(result.record_count(), 5);
    // NCT01 + NCT02 together; NCT03, the featureless record, and 29000001 alone.
    assert_eq!(result.supergroup_count(), 4);
    assert_eq!(result.group_sizes()[0], (0, 2));
}

#[test]
fn test_universe_key_missing_from_store() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();

    let provider = SqliteFeatureProvider::new(&db, "sample_data");
    let err = GroupingPipeline::new(params(SimilarityMetric::Jaccard, 0.4, GroupingPolicy::Combined))
        .run_for(&provider, &[RecordKey::new(Source::Ema, "EMEA/H/C/404")])
        .unwrap_err();
    assert!(matches!(err, GroupingError::MissingRecord { .. }));
}

// ── Persistence ───────────────────────────────────────────────────────────

#[test]
fn test_save_load_round_trip_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let original = {
        let db = open(dir.path());
        import_batch_dir(&db, "sample_data", dir.path()).unwrap();
        let result = grouped(&db, SimilarityMetric::Cosine, 0.4);
        GroupingStore::new(&db).save(&result).unwrap();
        result
    };

    let db = open(dir.path());
    let loaded = GroupingStore::new(&db).load(original.tag()).unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.fingerprint(), original.fingerprint());
    assert_eq!(loaded.group_sizes(), original.group_sizes());
    for (index, members) in original.iter() {
        assert_eq!(loaded.records_in_group(index).unwrap(), members);
    }
}

#[test]
fn test_load_unknown_tag_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(dir.path());
    let tag = GroupingTag::new("sample_data", SimilarityMetric::Jaccard, Threshold::new(0.3).unwrap());
    let err = GroupingStore::new(&db).load(&tag).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("sample_data/jaccard/0.3"));
}

#[test]
fn test_save_replaces_same_tag_and_list_is_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    let store = GroupingStore::new(&db);

    store.save(&grouped(&db, SimilarityMetric::Jaccard, 0.5)).unwrap();
    store.save(&grouped(&db, SimilarityMetric::Cosine, 0.4)).unwrap();
    store.save(&grouped(&db, SimilarityMetric::Cosine, 0.2)).unwrap();
    store.save(&grouped(&db, SimilarityMetric::Cosine, 0.4)).unwrap();

    let saved = store.list(None).unwrap();
    let tags: Vec<String> = saved.iter().map(|s| s.tag.to_string()).collect();
    assert_eq!(
        tags,
        vec![
            "sample_data/cosine/0.2",
            "sample_data/cosine/0.4",
            "sample_data/jaccard/0.5",
        ]
    );
    assert!(saved.iter().all(|s| s.policy == GroupingPolicy::Conjunctive));
    assert!(store.list(Some("other")).unwrap().is_empty());
}

#[test]
fn test_delete() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    let store = GroupingStore::new(&db);
    let result = grouped(&db, SimilarityMetric::Cosine, 0.4);
    store.save(&result).unwrap();

    assert!(store.exists(result.tag()).unwrap());
    assert!(store.delete(result.tag()).unwrap());
    assert!(!store.delete(result.tag()).unwrap());
    assert!(store.load(result.tag()).unwrap_err().is_not_found());
    let orphans: i64 = db
        .with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM grouping_members", [], |row| row.get(0))
                .map_err(|e| StorageError::SqliteError { message: e.to_string() })
        })
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn test_tampered_membership_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    write_batches(dir.path());
    let db = open(dir.path());
    import_batch_dir(&db, "sample_data", dir.path()).unwrap();
    let store = GroupingStore::new(&db);
    let result = grouped(&db, SimilarityMetric::Cosine, 0.4);
    store.save(&result).unwrap();

    // Move NCT02 out of NCT01's supergroup into the last one.
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE grouping_members SET supergroup = 3 WHERE record_id = 'NCT02'",
            [],
        )
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })
    })
    .unwrap();

    match store.load(result.tag()) {
        Err(StorageError::CorruptionDetected { details }) => {
            assert!(details.contains("fingerprint"), "{details}")
        }
        other => panic!("expected CorruptionDetected, got {other:?}"),
    }
}
