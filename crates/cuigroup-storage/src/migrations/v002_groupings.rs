//! V002: saved grouping results.

pub const MIGRATION_SQL: &str = r#"
-- One row per saved result, keyed by its tag. The fingerprint is the xxh3
-- digest of the partition, stored as a signed 64-bit integer.
CREATE TABLE IF NOT EXISTS groupings (
    dataset TEXT NOT NULL,
    metric TEXT NOT NULL,
    threshold REAL NOT NULL,
    policy TEXT NOT NULL,
    record_count INTEGER NOT NULL,
    supergroup_count INTEGER NOT NULL,
    fingerprint INTEGER NOT NULL,
    saved_at INTEGER NOT NULL,
    PRIMARY KEY (dataset, metric, threshold)
) STRICT;

-- Supergroup membership. Each record appears once per grouping.
CREATE TABLE IF NOT EXISTS grouping_members (
    dataset TEXT NOT NULL,
    metric TEXT NOT NULL,
    threshold REAL NOT NULL,
    supergroup INTEGER NOT NULL,
    source TEXT NOT NULL,
    record_id TEXT NOT NULL,
    PRIMARY KEY (dataset, metric, threshold, source, record_id),
    FOREIGN KEY (dataset, metric, threshold)
        REFERENCES groupings(dataset, metric, threshold) ON DELETE CASCADE
) STRICT;

CREATE INDEX IF NOT EXISTS idx_grouping_members_supergroup
    ON grouping_members(dataset, metric, threshold, supergroup);
"#;
