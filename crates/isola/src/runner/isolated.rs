//! One test, run in a child process

use crate::error::{Error, Result};
use crate::process::IsolatedCommand;
use crate::protocol::ProtocolParser;
use crate::status::TestResult;
use crate::testcase::TestCase;
use std::path::PathBuf;
use std::time::Duration;

pub(super) struct IsolatedRun {
    program: Option<PathBuf>,
    qualified: String,
    timeout: Duration,
}

/// Result rebuilt from the child, plus the lines it printed
pub(super) struct IsolatedOutcome {
    pub result: TestResult,
    pub output: Vec<String>,
}

impl IsolatedRun {
    pub fn new(program: Option<PathBuf>, qualified: &str, timeout: Duration) -> Self {
        Self {
            program,
            qualified: qualified.to_string(),
            timeout,
        }
    }

    fn command(&self) -> Result<IsolatedCommand> {
        match &self.program {
            Some(program) => Ok(IsolatedCommand::with_program(program, &self.qualified)),
            None => IsolatedCommand::for_test(&self.qualified)
                .map_err(|source| self.spawn_error(source)),
        }
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            test: self.qualified.clone(),
            source,
        }
    }

    /// Spawn, wait, and parse the protocol; violations are fatal
    pub fn execute(&self, test: &TestCase) -> Result<IsolatedOutcome> {
        let child = self
            .command()?
            .spawn_and_wait(self.timeout)
            .map_err(|source| self.spawn_error(source))?;

        let mut parser = ProtocolParser::new();
        for line in &child.lines {
            parser.feed(line)?;
        }

        let result = parser.finish(test.name(), child.timed_out, child.duration);
        if !result.is_pass() {
            tracing::debug!(
                test = %self.qualified,
                status = %result.status,
                exit_status = %child.status,
                "isolated test did not pass"
            );
        }

        Ok(IsolatedOutcome {
            result,
            output: parser.take_output(),
        })
    }
}
