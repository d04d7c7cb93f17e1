//! Configuration loading
//!
//! Reads a JSON5 file into [`Config`]. The path comes from, in order: an
//! explicit argument, `POLLCAST_CONFIG_PATH`, or
//! `<config dir>/pollcast/pollcast.json5`. A missing file means defaults.

pub mod schema;
pub mod types;

pub use types::{ClockConfig, Config, ConfigValidationError, PollsConfig};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "POLLCAST_CONFIG_PATH";

const CONFIG_FILENAME: &str = "pollcast.json5";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ConfigValidationError>),
}

fn join_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve the configuration file path
pub fn get_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pollcast")
        .join(CONFIG_FILENAME)
}

/// Load and validate configuration from the resolved path
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load and validate configuration from `path`; a missing file yields
/// defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config = match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Parse JSON5 text into a config (not validated)
pub fn parse_config(content: &str) -> Result<Config, String> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    json5::from_str(content).map_err(|e| e.to_string())
}
