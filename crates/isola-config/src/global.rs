//! Global Configuration (~/.isola/config.toml)
//!
//! Handles user-level defaults stored in `~/.isola/config.toml`.

use crate::settings::RunnerSettings;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.isola/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Runner defaults applied to every project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<RunnerSettings>,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the global configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(defaults) = &self.defaults {
            defaults.validate()?;
        }
        Ok(())
    }

    /// Get the global config file path (~/.isola/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".isola").join("config.toml"))
    }

    /// Runner defaults, or empty settings when the file sets none
    pub fn settings(&self) -> RunnerSettings {
        self.defaults.clone().unwrap_or_default()
    }
}
