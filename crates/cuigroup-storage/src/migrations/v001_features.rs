//! V001: record features.

pub const MIGRATION_SQL: &str = r#"
-- One row per record per dataset. Concept sets are JSON arrays of strings,
-- sorted and de-duplicated on write. rowid order is import order.
CREATE TABLE IF NOT EXISTS record_features (
    dataset TEXT NOT NULL,
    source TEXT NOT NULL,
    record_id TEXT NOT NULL,
    disease_cuis TEXT NOT NULL DEFAULT '[]',
    drug_cuis TEXT NOT NULL DEFAULT '[]',
    imported_at INTEGER NOT NULL,
    PRIMARY KEY (dataset, source, record_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_record_features_dataset
    ON record_features(dataset);
"#;
