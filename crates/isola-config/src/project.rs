//! Project Configuration (isola.toml)
//!
//! A project file carries a single `[runner]` table:
//!
//! ```toml
//! [runner]
//! tasks = 4
//! timeout = 30
//! reporters = ["console", "teamcity"]
//! ```

use crate::settings::RunnerSettings;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for when locating a project
pub const PROJECT_FILE: &str = "isola.toml";

/// Project configuration from isola.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Runner settings for this project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner: Option<RunnerSettings>,
}

impl ProjectConfig {
    /// Load project configuration from a file
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

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(runner) = &self.runner {
            runner.validate()?;
        }
        Ok(())
    }

    /// Runner settings, or empty settings when the file sets none
    pub fn settings(&self) -> RunnerSettings {
        self.runner.clone().unwrap_or_default()
    }
}
