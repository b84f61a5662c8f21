//! TeamCity service messages

use super::Reporter;
use crate::protocol::decode_description;
use crate::status::{Status, TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use std::io::{self, Write};

pub struct TeamCityReporter<W: Write> {
    writer: W,
}

impl TeamCityReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

/// Escape a value for use inside a service message attribute
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => escaped.push_str("||"),
            '\'' => escaped.push_str("|'"),
            '\n' => escaped.push_str("|n"),
            '\r' => escaped.push_str("|r"),
            '[' => escaped.push_str("|["),
            ']' => escaped.push_str("|]"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl<W: Write> TeamCityReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn message(&mut self, text: String) {
        if let Err(err) = writeln!(self.writer, "##teamcity[{}]", text) {
            tracing::debug!("teamcity reporter write failed: {}", err);
        }
    }
}

impl<W: Write> Reporter for TeamCityReporter<W> {
    fn suite_started(&mut self, suite: &Suite) {
        self.message(format!("testSuiteStarted name='{}'", escape(suite.name())));
    }

    fn suite_finished(&mut self, suite: &Suite) {
        self.message(format!("testSuiteFinished name='{}'", escape(suite.name())));
    }

    fn test_started(&mut self, test: &TestCase) {
        self.message(format!(
            "testStarted name='{}' captureStandardOutput='true'",
            escape(test.name())
        ));
    }

    fn test_output(&mut self, line: &str) {
        if let Err(err) = writeln!(self.writer, "{}", line) {
            tracing::debug!("teamcity reporter write failed: {}", err);
        }
    }

    fn test_finished(&mut self, result: &TestResult) {
        let name = escape(&result.name);
        let details = match result.status {
            Status::Passed => None,
            Status::Failed => Some(format!(
                "Test failed: {}",
                decode_description(&result.description)
            )),
            Status::Crashed => Some("Test crashed.".to_string()),
            Status::TimedOut => Some("Test timed out.".to_string()),
            Status::NotFound => Some("Test not found.".to_string()),
            Status::NotStarted => Some("Test not started.".to_string()),
        };

        if let Some(details) = details {
            self.message(format!(
                "testFailed name='{}' details='{}'",
                name,
                escape(&details)
            ));
        }

        self.message(format!(
            "testFinished name='{}' duration='{}'",
            name,
            result.duration.as_millis()
        ));
    }

    fn summary(&mut self, _summary: &TestsSummary) {}
}
