//! Machine-readable reporter: one JSON object per line

use super::Reporter;
use crate::status::{TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use serde::Serialize;
use std::io::{self, Write};

/// One output line: the event name plus the event's own fields
#[derive(Serialize)]
struct Record<'a, T: Serialize> {
    event: &'static str,
    #[serde(flatten)]
    data: &'a T,
}

#[derive(Serialize)]
struct SuiteEvent<'a> {
    suite: &'a str,
}

#[derive(Serialize)]
struct TestEvent<'a> {
    test: &'a str,
}

#[derive(Serialize)]
struct OutputEvent<'a> {
    line: &'a str,
}

pub struct JsonReporter<W: Write> {
    writer: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit<T: Serialize>(&mut self, event: &'static str, data: &T) {
        let written = serde_json::to_writer(&mut self.writer, &Record { event, data })
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.writer));
        if let Err(err) = written {
            tracing::debug!("json reporter write failed: {}", err);
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn suite_started(&mut self, suite: &Suite) {
        self.emit("suite_started", &SuiteEvent { suite: suite.name() });
    }

    fn suite_finished(&mut self, suite: &Suite) {
        self.emit("suite_finished", &SuiteEvent { suite: suite.name() });
    }

    fn test_started(&mut self, test: &TestCase) {
        self.emit("test_started", &TestEvent { test: test.name() });
    }

    fn test_output(&mut self, line: &str) {
        self.emit("test_output", &OutputEvent { line });
    }

    fn test_finished(&mut self, result: &TestResult) {
        self.emit("test_finished", result);
    }

    fn summary(&mut self, summary: &TestsSummary) {
        self.emit("summary", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn events(reporter: JsonReporter<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(reporter.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_events() {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.suite_started(&Suite::new("math"));
        reporter.test_output("hello");
        reporter.test_finished(
            &TestResult::new("bad", Status::Failed)
                .with_description("assertion failed: x")
                .with_duration(Duration::from_millis(12)),
        );
        reporter.summary(&TestsSummary {
            failed_tests: vec![(Status::Failed, "math/bad".to_string())],
            passed: 1,
            total: 2,
            wall_clock: Duration::from_millis(30),
        });

        assert_eq!(
            events(reporter),
            vec![
                json!({"event": "suite_started", "suite": "math"}),
                json!({"event": "test_output", "line": "hello"}),
                json!({
                    "event": "test_finished",
                    "name": "bad",
                    "status": "failed",
                    "description": "assertion failed: x",
                    "duration_ms": 12
                }),
                json!({
                    "event": "summary",
                    "failed_tests": [["failed", "math/bad"]],
                    "passed": 1,
                    "total": 2,
                    "wall_clock_ms": 30
                }),
            ]
        );
    }
}
