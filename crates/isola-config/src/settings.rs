//! Runner settings shared by every configuration layer
//!
//! Each layer (global file, project file, environment) produces a
//! `RunnerSettings` with only the fields it sets. Layers are folded together
//! with [`RunnerSettings::merge`], later layers winning.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Worker count used when no layer sets one
pub const DEFAULT_TASKS: usize = 1;

/// Per-test timeout (seconds) used when no layer sets one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings for a test run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunnerSettings {
    /// Number of worker threads running isolated tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<usize>,

    /// Per-test timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Reporters to enable, in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporters: Option<Vec<String>>,

    /// Disable the default reporter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,

    /// Only show errors and the summary on the console
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors_only: Option<bool>,

    /// Disable colored output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_color: Option<bool>,
}

impl RunnerSettings {
    /// Read overrides from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup
    ///
    /// Recognized variables: `ISOLA_TASKS`, `ISOLA_TIMEOUT`,
    /// `ISOLA_REPORTERS` (comma separated), `ISOLA_QUIET`,
    /// `ISOLA_ERRORS_ONLY`, `NO_COLOR`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(tasks) = lookup("ISOLA_TASKS") {
            settings.tasks = Some(parse_number("ISOLA_TASKS", &tasks)?);
        }

        if let Some(timeout) = lookup("ISOLA_TIMEOUT") {
            settings.timeout = Some(parse_number("ISOLA_TIMEOUT", &timeout)?);
        }

        if let Some(reporters) = lookup("ISOLA_REPORTERS") {
            settings.reporters = Some(
                reporters
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }

        if let Some(quiet) = lookup("ISOLA_QUIET") {
            settings.quiet = Some(parse_flag(&quiet));
        }

        if let Some(errors_only) = lookup("ISOLA_ERRORS_ONLY") {
            settings.errors_only = Some(parse_flag(&errors_only));
        }

        // NO_COLOR is honoured whenever it is present, regardless of value
        if lookup("NO_COLOR").is_some() {
            settings.no_color = Some(true);
        }

        Ok(settings)
    }

    /// Merge another layer into this one
    /// Other settings take precedence for non-None values
    pub fn merge(&mut self, other: &RunnerSettings) {
        if other.tasks.is_some() {
            self.tasks = other.tasks;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.reporters.is_some() {
            self.reporters = other.reporters.clone();
        }
        if other.quiet.is_some() {
            self.quiet = other.quiet;
        }
        if other.errors_only.is_some() {
            self.errors_only = other.errors_only;
        }
        if other.no_color.is_some() {
            self.no_color = other.no_color;
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tasks == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "tasks".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }

        if self.timeout == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "timeout".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        if let Some(reporters) = &self.reporters {
            if reporters.iter().any(|name| name.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "reporters".to_string(),
                    reason: "reporter names cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Effective worker count
    pub fn tasks(&self) -> usize {
        self.tasks.unwrap_or(DEFAULT_TASKS)
    }

    /// Effective per-test timeout in seconds
    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Effective reporter list, before the quiet/default rule is applied
    pub fn reporters(&self) -> &[String] {
        self.reporters.as_deref().unwrap_or(&[])
    }

    pub fn quiet(&self) -> bool {
        self.quiet.unwrap_or(false)
    }

    pub fn errors_only(&self) -> bool {
        self.errors_only.unwrap_or(false)
    }

    pub fn no_color(&self) -> bool {
        self.no_color.unwrap_or(false)
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a non-negative integer, got '{}'", value),
        })
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
