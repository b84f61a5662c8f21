//! Test outcomes and the records that carry them

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Final state of a single test run
///
/// Ordered by severity for display purposes. Only `Passed` and `Failed` can
/// come out of a test body; the rest are assigned by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    NotStarted = 0,
    Passed = 1,
    Failed = 2,
    Crashed = 3,
    TimedOut = 4,
    NotFound = 5,
}

impl Status {
    /// Numeric code, as printed by the quiet malformed-name path
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Upper-case label used in summaries
    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "NOT STARTED",
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Crashed => "CRASHED",
            Status::TimedOut => "TIMED OUT",
            Status::NotFound => "NOT FOUND",
        }
    }

    /// Check if this status is a pass
    pub fn is_pass(self) -> bool {
        self == Status::Passed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    /// Name of the test case (not qualified)
    pub name: String,
    pub status: Status,
    /// Diagnostic text; `|n` separates lines
    pub description: String,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl TestResult {
    pub fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
            description: String::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if this result is a pass
    pub fn is_pass(&self) -> bool {
        self.status.is_pass()
    }

    /// Description with the wire separator turned back into newlines
    pub fn description_lines(&self) -> impl Iterator<Item = &str> {
        self.description
            .split("|n")
            .filter(|line| !line.is_empty())
    }
}

/// Aggregate of a whole run, handed to reporters at the end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestsSummary {
    /// Every non-passing test, with its qualified name
    pub failed_tests: Vec<(Status, String)>,
    pub passed: usize,
    pub total: usize,
    #[serde(rename = "wall_clock_ms", serialize_with = "as_millis")]
    pub wall_clock: Duration,
}

impl TestsSummary {
    /// Number of failures with the given status
    pub fn count(&self, status: Status) -> usize {
        self.failed_tests
            .iter()
            .filter(|(failed, _)| *failed == status)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
