//! Parent/child wire protocol
//!
//! An isolated child reports on its standard output, one directive per line:
//!
//! | Line | Meaning |
//! |---|---|
//! | `{{started}}` | logger installed, body about to run |
//! | `{{failed <text>}}` | the test failed; `|n` separates lines in `<text>` |
//! | `{{finished}}` | body invocation completed |
//! | `{{exit}}` | child returned from its entry point |
//! | `{{error not found}}` | the requested test does not exist |
//! | `{{error unexpected test status}}` | the child hit an internal invariant |
//!
//! Every other line is test output, relayed verbatim.

use crate::status::{Status, TestResult};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected `{directive}` while the test was {state}")]
    OutOfOrder {
        directive: String,
        state: &'static str,
    },

    #[error("isolated test process reported an unexpected test status")]
    UnexpectedStatus,
}

/// One control line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Started,
    Failed(String),
    Finished,
    Exit,
    NotFound,
    UnexpectedStatus,
}

impl Directive {
    /// Parse a line; `None` means the line is plain test output
    ///
    /// Unrecognized `{{...}}` lines are output too; a test may print them.
    pub fn parse(line: &str) -> Option<Directive> {
        let body = line.strip_prefix(OPEN)?.strip_suffix(CLOSE)?;

        let directive = match body {
            "started" => Directive::Started,
            "finished" => Directive::Finished,
            "exit" => Directive::Exit,
            "error not found" => Directive::NotFound,
            "error unexpected test status" => Directive::UnexpectedStatus,
            _ => Directive::Failed(body.strip_prefix("failed ")?.to_string()),
        };

        Some(directive)
    }

    /// Line as written by the child, without the trailing newline
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Started => write!(f, "{OPEN}started{CLOSE}"),
            Directive::Failed(text) => {
                write!(f, "{OPEN}failed {}{CLOSE}", encode_description(text))
            }
            Directive::Finished => write!(f, "{OPEN}finished{CLOSE}"),
            Directive::Exit => write!(f, "{OPEN}exit{CLOSE}"),
            Directive::NotFound => write!(f, "{OPEN}error not found{CLOSE}"),
            Directive::UnexpectedStatus => write!(f, "{OPEN}error unexpected test status{CLOSE}"),
        }
    }
}

/// Flatten a multi-line description onto one protocol line
pub fn encode_description(text: &str) -> String {
    text.replace('\n', "|n")
}

/// Expand the `|n` separator back into newlines
pub fn decode_description(text: &str) -> String {
    text.replace("|n", "\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Started,
    Finished,
    Exited,
    NotFound,
}

impl State {
    fn describe(self) -> &'static str {
        match self {
            State::NotStarted => "not started",
            State::Started => "started",
            State::Finished => "finished",
            State::Exited => "exited",
            State::NotFound => "not found",
        }
    }
}

/// Rebuilds one test's result from the child's output stream
#[derive(Debug)]
pub struct ProtocolParser {
    state: State,
    failure: Option<String>,
    output: Vec<String>,
}

impl Default for ProtocolParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolParser {
    pub fn new() -> Self {
        Self {
            state: State::NotStarted,
            failure: None,
            output: Vec::new(),
        }
    }

    /// Consume one line of child output
    pub fn feed(&mut self, line: &str) -> Result<(), ProtocolError> {
        let Some(directive) = Directive::parse(line) else {
            self.output.push(line.to_string());
            return Ok(());
        };

        self.state = match (self.state, directive) {
            (_, Directive::UnexpectedStatus) => return Err(ProtocolError::UnexpectedStatus),
            (State::NotStarted, Directive::Started) => State::Started,
            (State::NotStarted, Directive::NotFound) => State::NotFound,
            (State::Started, Directive::Failed(text)) if self.failure.is_none() => {
                self.failure = Some(text);
                State::Started
            }
            (State::Started, Directive::Finished) => State::Finished,
            (State::Finished | State::NotFound, Directive::Exit) => State::Exited,
            (state, _) => {
                return Err(ProtocolError::OutOfOrder {
                    directive: line.to_string(),
                    state: state.describe(),
                })
            }
        };

        Ok(())
    }

    /// Relayed output lines, in arrival order
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Derive the final result once the stream is closed
    pub fn finish(&self, name: &str, timed_out: bool, duration: Duration) -> TestResult {
        let result = match (self.state, &self.failure) {
            (State::NotFound, _) => TestResult::new(name, Status::NotFound),
            (State::Exited, Some(text)) => {
                TestResult::new(name, Status::Failed).with_description(text.clone())
            }
            (State::Exited, None) => TestResult::new(name, Status::Passed),
            _ if timed_out => TestResult::new(name, Status::TimedOut),
            _ => TestResult::new(name, Status::Crashed),
        };
        result.with_duration(duration)
    }
}
