//! Host configuration, stored as YAML in the user config directory.

use crate::metrics::{is_valid_ppi, DEFAULT_FALLBACK_PPI};
use crate::CHANNEL_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasureConfig {
    /// Channel the plugin serves on.
    pub channel: String,
    /// Density reported when the display cannot be queried.
    pub fallback_ppi: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self { channel: CHANNEL_NAME.to_string(), fallback_ppi: DEFAULT_FALLBACK_PPI }
    }
}

impl MeasureConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.channel.trim().is_empty() {
            return Err(ConfigError::Invalid("channel must not be empty".into()));
        }
        if !is_valid_ppi(self.fallback_ppi) {
            return Err(ConfigError::Invalid(format!(
                "fallback_ppi must be positive and finite, got {}",
                self.fallback_ppi
            )));
        }
        Ok(())
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(?path, "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!(?path, "Loaded config");
        Ok(config)
    }

    /// Load from the default location.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }
}

/// Get the config directory for measure.
pub fn get_config_dir() -> PathBuf {
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("measure")
}

/// Path of the YAML config file.
pub fn config_file_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}
