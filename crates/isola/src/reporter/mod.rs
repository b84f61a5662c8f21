//! Reporters - sinks for lifecycle and result events
//!
//! The runner serializes calls through [`SharedReporter`]: one test's events
//! are always delivered as a single batch, so implementations need no
//! locking of their own.

mod console;
mod json;
mod subprocess;
mod teamcity;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use subprocess::SubprocessReporter;
pub use teamcity::TeamCityReporter;

use crate::error::{Error, Result};
use crate::status::{TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Names accepted by [`by_name`]
pub const REPORTER_NAMES: &[&str] = &["console", "teamcity", "json", "subprocess"];

pub trait Reporter {
    fn suite_started(&mut self, suite: &Suite);
    fn suite_finished(&mut self, suite: &Suite);
    fn test_started(&mut self, test: &TestCase);

    /// A line the test printed, relayed from the isolated process
    fn test_output(&mut self, _line: &str) {}

    fn test_finished(&mut self, result: &TestResult);
    fn summary(&mut self, summary: &TestsSummary);

    /// Called once, right before the process returns from its entry point
    fn finish(&mut self) {}
}

/// Output options shared by the built-in reporters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReporterOptions {
    pub color: bool,
    /// Only failures and the summary (console only)
    pub errors_only: bool,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            color: true,
            errors_only: false,
        }
    }
}

/// Build a built-in reporter writing to stdout
pub fn by_name(name: &str, options: ReporterOptions) -> Result<Box<dyn Reporter + Send>> {
    match name {
        "console" => Ok(Box::new(ConsoleReporter::stdout(options))),
        "teamcity" => Ok(Box::new(TeamCityReporter::stdout())),
        "json" => Ok(Box::new(JsonReporter::stdout())),
        "subprocess" => Ok(Box::new(SubprocessReporter::stdout())),
        _ => Err(Error::UnknownReporter(name.to_string())),
    }
}

/// Fans every event out to several reporters, in order
#[derive(Default)]
pub struct CombinedReporter {
    reporters: Vec<Box<dyn Reporter + Send>>,
}

impl CombinedReporter {
    pub fn new(reporters: Vec<Box<dyn Reporter + Send>>) -> Self {
        Self { reporters }
    }

    /// Resolve every name through [`by_name`]
    pub fn from_names<S: AsRef<str>>(names: &[S], options: ReporterOptions) -> Result<Self> {
        let reporters = names
            .iter()
            .map(|name| by_name(name.as_ref(), options))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(reporters))
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl Reporter for CombinedReporter {
    fn suite_started(&mut self, suite: &Suite) {
        for reporter in &mut self.reporters {
            reporter.suite_started(suite);
        }
    }

    fn suite_finished(&mut self, suite: &Suite) {
        for reporter in &mut self.reporters {
            reporter.suite_finished(suite);
        }
    }

    fn test_started(&mut self, test: &TestCase) {
        for reporter in &mut self.reporters {
            reporter.test_started(test);
        }
    }

    fn test_output(&mut self, line: &str) {
        for reporter in &mut self.reporters {
            reporter.test_output(line);
        }
    }

    fn test_finished(&mut self, result: &TestResult) {
        for reporter in &mut self.reporters {
            reporter.test_finished(result);
        }
    }

    fn summary(&mut self, summary: &TestsSummary) {
        for reporter in &mut self.reporters {
            reporter.summary(summary);
        }
    }

    fn finish(&mut self) {
        for reporter in &mut self.reporters {
            reporter.finish();
        }
    }
}

/// A reporter behind its own lock
pub struct SharedReporter {
    inner: Mutex<Box<dyn Reporter + Send>>,
}

impl SharedReporter {
    pub fn new(reporter: Box<dyn Reporter + Send>) -> Self {
        Self {
            inner: Mutex::new(reporter),
        }
    }

    /// Hold the reporter for a batch of events
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Reporter + Send>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> Box<dyn Reporter + Send> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
