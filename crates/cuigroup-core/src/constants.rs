/// Absolute tolerance applied when comparing a distance against the threshold.
pub const LINK_EPSILON: f64 = 1e-12;

/// Default dataset name.
pub const DEFAULT_DATASET: &str = "sample_data";

/// Default similarity metric name.
pub const DEFAULT_METRIC: &str = "cosine";

/// Default distance threshold.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 0.4;

/// Default grouping policy name.
pub const DEFAULT_POLICY: &str = "conjunctive";

/// Default SQLite database path, relative to the project root.
pub const DEFAULT_DATABASE_PATH: &str = "cuigroup.db";

/// Default directory scanned for JSON Lines feature batches.
pub const DEFAULT_BATCH_DIR: &str = "data/cuis";

/// Minimum record count before candidate scoring fans out over rayon.
pub const PARALLEL_MIN_RECORDS: usize = 2_048;
