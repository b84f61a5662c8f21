//! End-to-end tests for the test binaries
//!
//! Runs `isola-demo` and `isola-selftest` as a user would and checks exit
//! codes, the child protocol, and reporter output.

use assert_cmd::Command;
use isola_selftest::demo::{DEMO_PASSING, DEMO_TOTAL};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// Helper functions
// ============================================================================

/// Demo binary run from an empty directory, so no project config applies
fn demo_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::from(assert_cmd::cargo::cargo_bin_cmd!("isola-demo"));
    cmd.current_dir(workdir.path())
        .env_remove("ISOLA_TASKS")
        .env_remove("ISOLA_TIMEOUT")
        .env_remove("ISOLA_REPORTERS")
        .env_remove("ISOLA_QUIET")
        .env_remove("ISOLA_LOG");
    cmd
}

fn json_events(stdout: &[u8]) -> anyhow::Result<Vec<Value>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
        .collect()
}

fn events_named<'a>(events: &'a [Value], name: &str) -> Vec<&'a Value> {
    events.iter().filter(|event| event["event"] == name).collect()
}

// ============================================================================
// Single-test mode: the child side of the protocol
// ============================================================================

#[test]
fn test_single_passing_test_protocol() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["--test", "math/add", "-r", "subprocess"])
        .assert()
        .success()
        .stdout("{{started}}\n{{finished}}\n{{exit}}\n");
    Ok(())
}

fn protocol_output(workdir: &TempDir, test: &str, code: i32) -> String {
    let output = demo_cmd(workdir)
        .args(["--test", test, "-r", "subprocess"])
        .assert()
        .code(code)
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn test_single_failing_test_protocol() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    let output = protocol_output(&workdir, "math/bad", 1);
    insta::assert_snapshot!(output.trim_end(), @r"
    {{started}}
    {{failed assertions failed: |n - 1 + 1 == 3|n - 2 + 2 == 5}}
    {{finished}}
    {{exit}}
    ");
    Ok(())
}

#[test]
fn test_single_test_printing_braces() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    let output = protocol_output(&workdir, "output/braces", 0);
    insta::assert_snapshot!(output.trim_end(), @r"
    {{started}}
    {{user}}
    {{failed}}
    {{finished}}
    {{exit}}
    ");
    Ok(())
}

#[test]
fn test_single_panicking_test_reports_the_message() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-t", "panics/boom", "-r", "subprocess"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("{{failed test panicked: boom"))
        .stdout(predicate::str::ends_with("{{finished}}\n{{exit}}\n"));
    Ok(())
}

#[test]
fn test_single_missing_test_protocol() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["--test", "nosuch/test", "-r", "subprocess"])
        .assert()
        .success()
        .stdout("{{error not found}}\n{{exit}}\n");
    Ok(())
}

#[test]
fn test_single_crash_never_finishes() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["--test", "process/crash", "-r", "subprocess"])
        .assert()
        .failure()
        .stdout("{{started}}\n");
    Ok(())
}

#[test]
fn test_malformed_test_name_quiet() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-q", "-t", "add"])
        .assert()
        .code(1)
        .stdout("5");
    Ok(())
}

#[test]
fn test_malformed_test_name_is_fatal() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-t", "add"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid test name `add`"));
    Ok(())
}

// ============================================================================
// Usage errors
// ============================================================================

#[test]
fn test_unknown_reporter_is_fatal() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-r", "xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xml"));
    Ok(())
}

#[test]
fn test_zero_tasks_is_rejected() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir).args(["-j", "0"]).assert().code(2);
    Ok(())
}

#[test]
fn test_malformed_project_config_is_fatal() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    std::fs::write(workdir.path().join("isola.toml"), "[runner]\ntasks = \"many\"\n")?;
    demo_cmd(&workdir).args(["-f", "math/add"]).assert().code(2);
    Ok(())
}

#[test]
fn test_version_and_help() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    demo_cmd(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--tasks"));
    Ok(())
}

// ============================================================================
// Full isolated runs
// ============================================================================

#[test]
fn test_filtered_run_console() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-f", "math/add", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entering suite `math`."))
        .stdout(predicate::str::contains("test passed: `add`"))
        .stdout(predicate::str::contains("All tests passed!"))
        .stdout(predicate::str::contains("bad").not());
    Ok(())
}

#[test]
fn test_filtered_run_relays_output() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    let output = demo_cmd(&workdir)
        .args(["-f", "output/chatty", "-r", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let events = json_events(&output)?;
    let lines: Vec<_> = events_named(&events, "test_output")
        .iter()
        .map(|event| event["line"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(lines, vec!["hello from the test", "second line"]);
    Ok(())
}

#[test]
fn test_hanging_test_times_out() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-f", "process/hang", "-l", "1", "-r", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""status":"timed_out""#));
    Ok(())
}

#[test]
fn test_filter_for_missing_test_runs_nothing() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-f", "math/missing", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests found."));
    Ok(())
}

#[test]
fn test_full_run_on_worker_pool() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    let output = demo_cmd(&workdir)
        .args(["-j", "4", "-l", "1", "-r", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let events = json_events(&output)?;
    let finished = events_named(&events, "test_finished");
    assert_eq!(finished.len(), DEMO_TOTAL);

    let status_of = |name: &str| {
        finished
            .iter()
            .find(|event| event["name"] == name)
            .map(|event| event["status"].as_str().unwrap_or_default().to_string())
    };
    assert_eq!(status_of("add").as_deref(), Some("passed"));
    assert_eq!(status_of("negative").as_deref(), Some("passed"));
    assert_eq!(status_of("bad").as_deref(), Some("failed"));
    assert_eq!(status_of("boom").as_deref(), Some("failed"));
    assert_eq!(status_of("crash").as_deref(), Some("crashed"));
    assert_eq!(status_of("exit").as_deref(), Some("crashed"));
    assert_eq!(status_of("hang").as_deref(), Some("timed_out"));
    assert_eq!(status_of("deep").as_deref(), Some("passed"));
    assert_eq!(status_of("orphan").as_deref(), Some("timed_out"));
    assert_eq!(status_of("braces").as_deref(), Some("passed"));

    let summary = events_named(&events, "summary");
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0]["passed"], DEMO_PASSING);
    assert_eq!(summary[0]["total"], DEMO_TOTAL);
    Ok(())
}

#[test]
fn test_sequential_run_console_summary() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-l", "1", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("leaving suite `inner`."))
        .stdout(predicate::str::contains("Summary:"))
        .stdout(predicate::str::contains(" - math/bad: FAILED"))
        .stdout(predicate::str::contains(" - process/crash: CRASHED"))
        .stdout(predicate::str::contains(" - process/hang: TIMED OUT"))
        .stdout(predicate::str::contains(" - process/orphan: TIMED OUT"))
        .stdout(predicate::str::contains("{{user}}"));
    Ok(())
}

#[test]
fn test_teamcity_reporter() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    demo_cmd(&workdir)
        .args(["-f", "math/bad", "-r", "teamcity"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("##teamcity[testSuiteStarted name='math']"))
        .stdout(predicate::str::contains("##teamcity[testFailed name='bad'"));
    Ok(())
}

// ============================================================================
// The framework's own suites
// ============================================================================

#[test]
fn test_selftest_suites_all_pass() -> anyhow::Result<()> {
    let workdir = TempDir::new()?;
    let mut cmd = Command::from(assert_cmd::cargo::cargo_bin_cmd!("isola-selftest"));
    cmd.current_dir(workdir.path())
        .args(["-j", "4", "--no-color"])
        .env_remove("ISOLA_REPORTERS")
        .env_remove("ISOLA_QUIET")
        .assert()
        .success()
        .stdout(predicate::str::contains("All tests passed!"));
    Ok(())
}
