//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;

use filstat_core::error::{FilstatError, Result};

pub use schema::{FilstatConfig, MetricsConfig};

/// Path used by the binary when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "filstat.yaml";

pub fn load_from_file(path: &str) -> Result<FilstatConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| FilstatError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<FilstatConfig> {
    let cfg: FilstatConfig = serde_yaml::from_str(s)
        .map_err(|e| FilstatError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
