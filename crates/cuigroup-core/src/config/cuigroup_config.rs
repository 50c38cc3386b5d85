//! Top-level cuigroup configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{GroupingConfig, ImportConfig, StorageConfig};
use crate::errors::ConfigError;
use crate::types::GroupingParams;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "cuigroup.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`CUIGROUP_*`)
/// 3. Project config (`cuigroup.toml` in project root)
/// 4. User config (`~/.cuigroup/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CuiGroupConfig {
    pub grouping: GroupingConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dataset: Option<String>,
    pub metric: Option<String>,
    pub distance_threshold: Option<f64>,
    pub policy: Option<String>,
    pub database_path: Option<PathBuf>,
    pub batch_dir: Option<PathBuf>,
}

impl CuiGroupConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(path = %user_config_path.display(), error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    ///
    /// Metric and policy names are checked here so a typo fails at startup
    /// rather than after features have been loaded.
    pub fn validate(config: &CuiGroupConfig) -> Result<(), ConfigError> {
        if let Some(threshold) = config.grouping.distance_threshold {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::ThresholdOutOfRange { value: threshold });
            }
        }
        if let Some(ref metric) = config.grouping.metric {
            metric.parse::<crate::types::SimilarityMetric>()?;
        }
        if let Some(ref policy) = config.grouping.policy {
            policy.parse::<crate::types::GroupingPolicy>()?;
        }
        if let Some(ref dataset) = config.grouping.dataset {
            if dataset.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "grouping.dataset".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Typed parameters of the configured grouping run.
    pub fn grouping_params(&self) -> Result<GroupingParams, ConfigError> {
        self.grouping.params()
    }

    /// Returns the user config path: `~/.cuigroup/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut CuiGroupConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: CuiGroupConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut CuiGroupConfig, other: &CuiGroupConfig) {
        if other.grouping.dataset.is_some() {
            base.grouping.dataset = other.grouping.dataset.clone();
        }
        if other.grouping.metric.is_some() {
            base.grouping.metric = other.grouping.metric.clone();
        }
        if other.grouping.distance_threshold.is_some() {
            base.grouping.distance_threshold = other.grouping.distance_threshold;
        }
        if other.grouping.policy.is_some() {
            base.grouping.policy = other.grouping.policy.clone();
        }
        if other.grouping.parallel.is_some() {
            base.grouping.parallel = other.grouping.parallel;
        }

        if other.storage.database_path.is_some() {
            base.storage.database_path = other.storage.database_path.clone();
        }

        if other.import.batch_dir.is_some() {
            base.import.batch_dir = other.import.batch_dir.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `CUIGROUP_DATASET`, `CUIGROUP_DISTANCE_THRESHOLD`, etc.
    /// Unparseable numeric values are ignored.
    fn apply_env_overrides(config: &mut CuiGroupConfig) {
        if let Ok(val) = std::env::var("CUIGROUP_DATASET") {
            config.grouping.dataset = Some(val);
        }
        if let Ok(val) = std::env::var("CUIGROUP_METRIC") {
            config.grouping.metric = Some(val);
        }
        if let Ok(val) = std::env::var("CUIGROUP_DISTANCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.grouping.distance_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CUIGROUP_POLICY") {
            config.grouping.policy = Some(val);
        }
        if let Ok(val) = std::env::var("CUIGROUP_PARALLEL") {
            if let Ok(v) = val.parse::<bool>() {
                config.grouping.parallel = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CUIGROUP_DATABASE_PATH") {
            config.storage.database_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("CUIGROUP_BATCH_DIR") {
            config.import.batch_dir = Some(PathBuf::from(val));
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut CuiGroupConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.dataset {
            config.grouping.dataset = Some(v.clone());
        }
        if let Some(ref v) = cli.metric {
            config.grouping.metric = Some(v.clone());
        }
        if let Some(v) = cli.distance_threshold {
            config.grouping.distance_threshold = Some(v);
        }
        if let Some(ref v) = cli.policy {
            config.grouping.policy = Some(v.clone());
        }
        if let Some(ref v) = cli.database_path {
            config.storage.database_path = Some(v.clone());
        }
        if let Some(ref v) = cli.batch_dir {
            config.import.batch_dir = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level config directory: `~/.cuigroup/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".cuigroup"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
