//! Feature import configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for importing feature batches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportConfig {
    /// Directory of `*.jsonl` feature batches. Default: "data/cuis".
    pub batch_dir: Option<PathBuf>,
}

impl ImportConfig {
    pub fn effective_batch_dir(&self) -> PathBuf {
        self.batch_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_BATCH_DIR))
    }
}
