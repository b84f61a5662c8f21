//! Configuration loading and precedence tests

use isola_config::{ConfigError, ConfigLoader, RunnerSettings};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "ISOLA_TASKS",
    "ISOLA_TIMEOUT",
    "ISOLA_REPORTERS",
    "ISOLA_QUIET",
    "ISOLA_ERRORS_ONLY",
    "NO_COLOR",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn write_project(dir: &Path, content: &str) {
    fs::write(dir.join("isola.toml"), content).unwrap();
}

fn loader_with_global(home: &TempDir, content: Option<&str>) -> ConfigLoader {
    let path = home.path().join("config.toml");
    if let Some(content) = content {
        fs::write(&path, content).unwrap();
    }
    ConfigLoader::new().with_global_path(path)
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
#[serial]
fn test_project_overrides_global() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write_project(project.path(), "[runner]\ntasks = 6\n");

    let config = loader_with_global(&home, Some("[defaults]\ntasks = 2\ntimeout = 40\n"))
        .load_from_directory(project.path())
        .unwrap();

    assert_eq!(config.settings.tasks(), 6);
    assert_eq!(config.settings.timeout(), 40);
}

#[test]
#[serial]
fn test_env_overrides_project() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write_project(project.path(), "[runner]\ntasks = 6\ntimeout = 3\n");

    env::set_var("ISOLA_TASKS", "12");
    let config = loader_with_global(&home, None)
        .load_from_directory(project.path())
        .unwrap();
    clear_env();

    assert_eq!(config.settings.tasks(), 12);
    assert_eq!(config.settings.timeout(), 3);
}

#[test]
#[serial]
fn test_env_reporters_replace_project_reporters() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write_project(project.path(), "[runner]\nreporters = [\"console\"]\n");

    env::set_var("ISOLA_REPORTERS", "teamcity,json");
    let config = loader_with_global(&home, None)
        .load_from_directory(project.path())
        .unwrap();
    clear_env();

    assert_eq!(
        config.settings.reporters(),
        ["teamcity".to_string(), "json".to_string()]
    );
}

#[test]
#[serial]
fn test_no_color_from_env() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    env::set_var("NO_COLOR", "1");
    let config = loader_with_global(&home, None)
        .load_from_directory(project.path())
        .unwrap();
    clear_env();

    assert!(config.settings.no_color());
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("[runner]\ntasks = 0\n")]
#[case("[runner]\ntimeout = 0\n")]
#[case("[runner]\nreporters = [\"\"]\n")]
#[case("[runner]\nworkers = 2\n")]
#[case("[runner\n")]
#[serial]
fn test_invalid_project_file(#[case] content: &str) {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write_project(project.path(), content);

    let result = loader_with_global(&home, None).load_from_directory(project.path());
    assert!(result.is_err(), "expected {:?} to be rejected", content);
}

#[test]
#[serial]
fn test_invalid_env_value() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    env::set_var("ISOLA_TIMEOUT", "soon");
    let result = loader_with_global(&home, None).load_from_directory(project.path());
    clear_env();

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    let config = loader_with_global(&home, None)
        .load_from_directory(project.path())
        .unwrap();

    assert_eq!(config.settings, RunnerSettings::default());
    assert_eq!(config.settings.tasks(), isola_config::DEFAULT_TASKS);
    assert_eq!(config.settings.timeout(), isola_config::DEFAULT_TIMEOUT_SECS);
}
