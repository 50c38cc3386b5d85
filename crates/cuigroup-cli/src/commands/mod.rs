//! Subcommand handlers. Each returns `Result<(), CliError>`; `main` maps the
//! error to an exit code.

pub mod group;
pub mod import;
pub mod list;
pub mod show;

use std::path::{Path, PathBuf};

use clap::Args;
use cuigroup_core::config::{CliOverrides, CuiGroupConfig};
use cuigroup_storage::DatabaseManager;
use tracing::debug;

use crate::error::CliError;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project root holding cuigroup.toml
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// SQLite database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Dataset name
    #[arg(long, global = true)]
    pub dataset: Option<String>,
}

/// Grouping selection flags shared by `group` and `show`.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Similarity metric: cosine or jaccard
    #[arg(long)]
    pub metric: Option<String>,

    /// Distance threshold in [0, 1]
    #[arg(long)]
    pub threshold: Option<f64>,
}

impl GlobalArgs {
    /// Resolve configuration with these flags as the CLI layer.
    pub fn load_config(&self, mut overrides: CliOverrides) -> Result<CuiGroupConfig, CliError> {
        overrides.dataset = overrides.dataset.or_else(|| self.dataset.clone());
        overrides.database_path = overrides.database_path.or_else(|| self.db.clone());
        let config = CuiGroupConfig::load(&self.root, Some(&overrides))?;
        debug!(?config, "configuration resolved");
        Ok(config)
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Open the configured database, relative paths taken from `--root`.
    pub fn open_database(&self, config: &CuiGroupConfig) -> Result<DatabaseManager, CliError> {
        let path = self.resolve(&config.storage.effective_database_path());
        Ok(DatabaseManager::open(&path)?)
    }
}

impl SelectionArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            metric: self.metric.clone(),
            distance_threshold: self.threshold,
            ..Default::default()
        }
    }
}
