//! Child side of the parent/child protocol

use super::Reporter;
use crate::protocol::Directive;
use crate::status::{Status, TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use std::io::{self, Write};

/// Writes protocol directives for the parent runner
///
/// Every directive is flushed immediately so the parent sees everything
/// written before a crash.
pub struct SubprocessReporter<W: Write> {
    writer: W,
}

impl SubprocessReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> SubprocessReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, directive: Directive) {
        let written = writeln!(self.writer, "{}", directive).and_then(|()| self.writer.flush());
        if let Err(err) = written {
            tracing::error!("failed to write `{}` to the parent runner: {}", directive, err);
        }
    }
}

impl<W: Write> Reporter for SubprocessReporter<W> {
    fn suite_started(&mut self, _suite: &Suite) {}

    fn suite_finished(&mut self, _suite: &Suite) {}

    fn test_started(&mut self, _test: &TestCase) {
        self.send(Directive::Started);
    }

    fn test_finished(&mut self, result: &TestResult) {
        match result.status {
            Status::Passed => {}
            Status::Failed => self.send(Directive::Failed(result.description.clone())),
            _ => self.send(Directive::UnexpectedStatus),
        }
        self.send(Directive::Finished);
    }

    fn summary(&mut self, summary: &TestsSummary) {
        if summary.total == 0 {
            self.send(Directive::NotFound);
        }
    }

    fn finish(&mut self) {
        self.send(Directive::Exit);
    }
}
