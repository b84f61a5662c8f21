//! Configuration Loader
//!
//! Handles loading and merging runner settings from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{ProjectConfig, PROJECT_FILE};
use crate::settings::RunnerSettings;
use crate::ConfigResult;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.isola/config.toml) - lowest priority
/// 2. Project config (./isola.toml) - overrides global
/// 3. Environment variables (ISOLA_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Global config path; resolved from the home directory when unset
    global_config_path: Option<PathBuf>,
    /// Whether environment variables are consulted
    read_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after every layer was applied
    pub settings: RunnerSettings,

    /// Project root directory (where isola.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
            read_env: true,
        }
    }

    /// Use an explicit global config file instead of ~/.isola/config.toml
    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Skip the environment layer
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find isola.toml, then merges it over
    /// the global config and applies environment overrides on top.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut settings = self.load_global_config()?.settings();

        let (project_root, project_config) = find_project_config(start_dir)?;
        settings.merge(&project_config.settings());

        if self.read_env {
            settings.merge(&RunnerSettings::from_env()?);
        }

        settings.validate()?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load global configuration; a missing file yields the defaults
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match GlobalConfig::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory means no global layer
                Err(_) => return Ok(GlobalConfig::default()),
            },
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find project configuration by walking up the directory tree
fn find_project_config(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(PROJECT_FILE);

        if config_path.exists() {
            let project_config = ProjectConfig::load_from_file(&config_path)?;
            return Ok((Some(current), project_config));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok((None, ProjectConfig::default())),
        }
    }
}

impl Config {
    /// Check if a project file was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn isolated_loader(home: &TempDir) -> ConfigLoader {
        ConfigLoader::new()
            .with_global_path(home.path().join("config.toml"))
            .without_env()
    }

    #[test]
    fn test_no_project_config() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        let config = isolated_loader(&home)
            .load_from_directory(project.path())
            .unwrap();

        assert!(!config.is_project());
        assert_eq!(config.settings, RunnerSettings::default());
    }

    #[test]
    fn test_find_config_in_parent() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("isola.toml"), "[runner]\ntasks = 3\n").unwrap();

        let sub_dir = project.path().join("tests").join("unit");
        fs::create_dir_all(&sub_dir).unwrap();

        let config = isolated_loader(&home).load_from_directory(&sub_dir).unwrap();

        assert_eq!(config.project_root(), Some(project.path()));
        assert_eq!(config.settings.tasks(), 3);
    }
}
