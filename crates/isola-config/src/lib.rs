//! Isola Configuration System
//!
//! Provides the runner settings used by isola test binaries:
//! - Project configuration (isola.toml)
//! - Global user configuration (~/.isola/config.toml)
//! - Environment overrides (ISOLA_*)
//!
//! # Configuration Hierarchy
//!
//! Settings are merged in the following order (later overrides earlier):
//! 1. Global config (~/.isola/config.toml)
//! 2. Project config (./isola.toml, searched upward)
//! 3. Environment variables (ISOLA_*)
//! 4. CLI flags (applied by the test binary)
//!
//! # Example
//!
//! ```no_run
//! use isola_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{} worker(s)", config.settings.tasks());
//! ```

pub mod global;
pub mod loader;
pub mod project;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::ProjectConfig;
pub use settings::{RunnerSettings, DEFAULT_TASKS, DEFAULT_TIMEOUT_SECS};
