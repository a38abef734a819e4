//! Subcommands.

pub mod batch;
pub mod config;
pub mod parse;

use std::path::{Path, PathBuf};

use cardscan_core::models::config::CardscanConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardscan")
        .join("config.json")
}

/// The `--config` path, or the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit path must exist; the default one
/// falls back to built-in defaults when missing.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<CardscanConfig> {
    match explicit {
        Some(path) => Ok(CardscanConfig::from_file(Path::new(path))?),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(CardscanConfig::from_file(&path)?)
            } else {
                Ok(CardscanConfig::default())
            }
        }
    }
}
