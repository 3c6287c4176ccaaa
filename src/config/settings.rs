//! Application settings loaded from a TOML file.
//!
//! The file is optional: every field has a default, so a missing file yields the
//! stock configuration (four levels, NGN, six-character passwords). A file that exists
//! but cannot be parsed is an error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "DUES_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "dues.toml";

/// Settings for the whole application
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Currency code prefixed to totals
    pub currency: String,
    /// Academic levels offered, in display order
    pub levels: Vec<String>,
    /// Minimum accepted account password length
    pub min_password_length: usize,
    /// Directory CSV exports are written to
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            levels: ["100 lvl", "200 lvl", "300 lvl", "400 lvl"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_password_length: 6,
            export_dir: PathBuf::from("exports"),
        }
    }
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse configuration: {e}"),
    })
}

/// Loads configuration from a TOML file, falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from the file named by `DUES_CONFIG`, or `./dues.toml`.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
