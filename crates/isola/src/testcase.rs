//! Test cases - a named body plus its expected-failure policy

use crate::assertion::{AssertionError, AssertionLogger, Outcome, Polarity, Verdict};
use crate::context;
use crate::panics;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Callable run by a test case
pub type TestBody = Arc<dyn Fn() -> Outcome + Send + Sync>;

/// Why a test invocation did not pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TestFailure {
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error("test panicked: {0}")]
    Panicked(String),
}

/// A named unit of work
#[derive(Clone)]
pub struct TestCase {
    name: String,
    body: TestBody,
    polarity: Polarity,
    expected_failures: usize,
}

impl TestCase {
    /// A test expected to pass without any failed assertion
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
            polarity: Polarity::Positive,
            expected_failures: 0,
        }
    }

    /// A test expected to fail at least one assertion
    pub fn negative<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        Self::negative_n(name, 0, body)
    }

    /// A test expected to fail exactly `count` assertions (0 = any number)
    pub fn negative_n<F>(name: impl Into<String>, count: usize, body: F) -> Self
    where
        F: Fn() -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
            polarity: Polarity::Negative,
            expected_failures: count,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn expected_failures(&self) -> usize {
        self.expected_failures
    }

    /// Run the body under a freshly installed assertion logger
    ///
    /// The logger is removed again on every exit path. When the logger was
    /// already finalized by a critical assertion, its recorded verdict wins
    /// over whatever the body returned afterwards.
    pub fn invoke(&self) -> Result<(), TestFailure> {
        let installed = context::install(AssertionLogger::new(
            self.polarity,
            self.expected_failures,
        ));
        let _ = panics::take_recorded();

        let returned = panics::catch(|| (self.body)());

        let verdict = match returned {
            Ok(Ok(())) => match installed.finalize() {
                Ok(()) => Verdict::Passed,
                Err(abort) => abort.into_verdict(),
            },
            Ok(Err(abort)) => installed
                .with(|logger| logger.verdict().cloned())
                .unwrap_or_else(|| abort.into_verdict()),
            Err(payload) => {
                let message = panics::take_recorded()
                    .unwrap_or_else(|| panics::payload_message(payload.as_ref()));
                return Err(TestFailure::Panicked(message));
            }
        };

        match verdict {
            Verdict::Passed | Verdict::ExpectedExit => Ok(()),
            Verdict::Failed(err) => Err(err.into()),
        }
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("polarity", &self.polarity)
            .field("expected_failures", &self.expected_failures)
            .finish_non_exhaustive()
    }
}
