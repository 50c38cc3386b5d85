//! JSON Lines batch import into the record_features table.
//!
//! A batch directory holds `*.jsonl` files, one record per line:
//!
//! ```text
//! {"source": "ctgov", "record_id": "NCT00000102", "disease_cuis": ["C0029456"], "drug_cuis": null}
//! ```
//!
//! `null` or missing CUI lists are empty sets. Numeric record ids are accepted
//! and stored as their decimal text. Files are imported in path order inside a
//! single transaction, so a bad line leaves the database untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use cuigroup_core::errors::StorageError;
use cuigroup_core::types::collections::FxHashSet;
use cuigroup_core::types::{FeatureSet, RecordKey, Source};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::connection::DatabaseManager;
use crate::queries::features;

/// File extension of feature batch files.
pub const BATCH_EXTENSION: &str = "jsonl";

/// Counts from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: usize,
    /// Distinct records written.
    pub records: usize,
    /// Records with neither disease nor drug concepts. They are kept and
    /// become singleton supergroups.
    pub featureless: usize,
    /// Lines whose key already appeared earlier in this import; the later
    /// line wins.
    pub duplicates: usize,
}

#[derive(Debug, Deserialize)]
struct BatchLine {
    source: String,
    record_id: Value,
    #[serde(default)]
    disease_cuis: Option<Vec<String>>,
    #[serde(default)]
    drug_cuis: Option<Vec<String>>,
}

/// Import every `*.jsonl` file of `dir` into `dataset`.
pub fn import_batch_dir(
    db: &DatabaseManager,
    dataset: &str,
    dir: &Path,
) -> Result<ImportReport, StorageError> {
    let entries = fs::read_dir(dir).map_err(|e| import_err(dir, e))?;
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| import_err(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == BATCH_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        warn!(dir = %dir.display(), "no batch files found");
    }
    import_files(db, dataset, &files)
}

/// Import a single batch file into `dataset`.
pub fn import_batch_file(
    db: &DatabaseManager,
    dataset: &str,
    path: &Path,
) -> Result<ImportReport, StorageError> {
    import_files(db, dataset, &[path.to_path_buf()])
}

fn import_files(
    db: &DatabaseManager,
    dataset: &str,
    files: &[PathBuf],
) -> Result<ImportReport, StorageError> {
    let mut report = ImportReport {
        files: files.len(),
        ..Default::default()
    };
    let mut seen: FxHashSet<RecordKey> = FxHashSet::default();
    let mut records: Vec<(RecordKey, FeatureSet)> = Vec::new();

    for path in files {
        let content = fs::read_to_string(path).map_err(|e| import_err(path, e))?;
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, features) =
                parse_line(line).map_err(|message| StorageError::ImportFailed {
                    path: path.display().to_string(),
                    message: format!("line {}: {message}", line_no + 1),
                })?;
            if !seen.insert(key.clone()) {
                report.duplicates += 1;
                warn!(key = %key, path = %path.display(), "record repeated in batch; keeping the later line");
            }
            records.push((key, features));
        }
    }

    let imported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    db.with_transaction(|conn| {
        for (key, features) in &records {
            features::upsert_features(conn, dataset, key, features, imported_at)?;
        }
        Ok(())
    })?;

    // Later lines overwrite earlier ones, so count featureless records on the
    // final value of each key.
    let mut last: Vec<&(RecordKey, FeatureSet)> = Vec::with_capacity(seen.len());
    let mut counted: FxHashSet<&RecordKey> = FxHashSet::default();
    for record in records.iter().rev() {
        if counted.insert(&record.0) {
            last.push(record);
        }
    }
    report.records = last.len();
    report.featureless = last.iter().filter(|(_, f)| f.is_featureless()).count();

    if report.featureless > 0 {
        warn!(
            dataset,
            featureless = report.featureless,
            "imported records without disease or drug concepts"
        );
    }
    info!(
        dataset,
        files = report.files,
        records = report.records,
        duplicates = report.duplicates,
        "batch import complete"
    );
    Ok(report)
}

fn parse_line(line: &str) -> Result<(RecordKey, FeatureSet), String> {
    let raw: BatchLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let source: Source = raw.source.parse().map_err(|e| format!("{e}"))?;
    let record_id = match raw.record_id {
        Value::String(s) if !s.trim().is_empty() => s,
        Value::Number(n) => n.to_string(),
        other => return Err(format!("record_id must be a non-empty string or number, got {other}")),
    };
    let features = FeatureSet::new(
        raw.disease_cuis.unwrap_or_default(),
        raw.drug_cuis.unwrap_or_default(),
    );
    Ok((RecordKey::new(source, record_id), features))
}

fn import_err(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::ImportFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
