//! Configuration system for cuigroup.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod cuigroup_config;
pub mod grouping_config;
pub mod import_config;
pub mod storage_config;

pub use cuigroup_config::{CliOverrides, CuiGroupConfig};
pub use grouping_config::GroupingConfig;
pub use import_config::ImportConfig;
pub use storage_config::StorageConfig;
