//! Assertion logger - collects failures for one running test case
//!
//! Every `check`/`require` evaluated inside a test body lands here. Checks
//! only accumulate; requires accumulate and then finalize on the spot, which
//! stops the body through an [`Abort`] value propagated with `?`.
//!
//! Finalization compares the collected failures against the test's
//! [`Polarity`]:
//! - positive tests pass only with zero failures
//! - negative tests pass when they fail the expected number of times
//!   (any non-zero number when no count was given)

use std::fmt;
use thiserror::Error;

/// Whether a test is expected to succeed or to collect failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Failure outcomes a test body can end with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionError {
    #[error("{message}")]
    AssertionsFailed { count: usize, message: String },

    #[error(
        "negative test conditions not met ({}{actual} assertions failed); {message}",
        expected_prefix(*.expected)
    )]
    ExpectedFailureNotMet {
        expected: usize,
        actual: usize,
        message: String,
    },
}

fn expected_prefix(expected: usize) -> String {
    if expected == 0 {
        String::new()
    } else {
        format!("{} assertions expected to fail, ", expected)
    }
}

/// Result of finalizing a logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Positive test with no failures
    Passed,
    /// Negative test whose failures matched the contract; the body stops and
    /// the test counts as passed, without any diagnostic
    ExpectedExit,
    /// The test failed
    Failed(AssertionError),
}

impl Verdict {
    /// Check if this verdict counts as a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Passed | Verdict::ExpectedExit)
    }

    fn into_outcome(self) -> Outcome {
        match self {
            Verdict::Passed => Ok(()),
            verdict => Err(Abort(verdict)),
        }
    }
}

/// Signal that stops a test body after the logger was finalized
///
/// It cannot be constructed outside the framework and is not a
/// `std::error::Error`, so it cannot be folded into a generic error type by
/// accident. The only thing a body can do with it is propagate it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an abort must be propagated out of the test body"]
pub struct Abort(Verdict);

impl Abort {
    /// The recorded verdict
    pub fn verdict(&self) -> &Verdict {
        &self.0
    }

    /// Check if this is the silent exit of a satisfied negative test
    pub fn is_expected_exit(&self) -> bool {
        self.0 == Verdict::ExpectedExit
    }

    pub(crate) fn into_verdict(self) -> Verdict {
        self.0
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Verdict::Passed => f.write_str("test passed"),
            Verdict::ExpectedExit => f.write_str("expected failures reached"),
            Verdict::Failed(err) => err.fmt(f),
        }
    }
}

/// What a test body returns
pub type Outcome = Result<(), Abort>;

/// Per-test accumulator of assertion failures
#[derive(Debug)]
pub struct AssertionLogger {
    polarity: Polarity,
    expected_to_fail: usize,
    failures: Vec<String>,
    verdict: Option<Verdict>,
}

impl AssertionLogger {
    /// Create a logger; `expected_to_fail == 0` leaves negative tests unconstrained
    pub fn new(polarity: Polarity, expected_to_fail: usize) -> Self {
        Self {
            polarity,
            expected_to_fail,
            failures: Vec::new(),
            verdict: None,
        }
    }

    pub fn positive() -> Self {
        Self::new(Polarity::Positive, 0)
    }

    /// Record a failure; critical failures finalize immediately
    ///
    /// Once finalized, the logger is sealed: non-critical failures are
    /// ignored and critical ones hand back the recorded verdict untouched.
    pub fn log(&mut self, description: impl Into<String>, critical: bool) -> Outcome {
        if let Some(verdict) = &self.verdict {
            if critical {
                return verdict.clone().into_outcome();
            }
            tracing::debug!("assertion logged after finalization was ignored");
            return Ok(());
        }

        self.failures.push(description.into());

        if critical {
            return self.finalize();
        }

        Ok(())
    }

    /// Evaluate the collected failures against the polarity
    ///
    /// Only the first call computes a verdict; later calls return it again.
    pub fn finalize(&mut self) -> Outcome {
        if let Some(verdict) = &self.verdict {
            return verdict.clone().into_outcome();
        }

        let verdict = self.evaluate();
        self.verdict = Some(verdict.clone());
        verdict.into_outcome()
    }

    fn evaluate(&self) -> Verdict {
        let actual = self.failures.len();

        match self.polarity {
            Polarity::Positive if actual == 0 => Verdict::Passed,
            Polarity::Positive => Verdict::Failed(AssertionError::AssertionsFailed {
                count: actual,
                message: self.failure_message(),
            }),
            Polarity::Negative => {
                let met = if self.expected_to_fail == 0 {
                    actual > 0
                } else {
                    actual == self.expected_to_fail
                };

                if met {
                    Verdict::ExpectedExit
                } else {
                    Verdict::Failed(AssertionError::ExpectedFailureNotMet {
                        expected: self.expected_to_fail,
                        actual,
                        message: self.failure_message(),
                    })
                }
            }
        }
    }

    fn failure_message(&self) -> String {
        match self.failures.as_slice() {
            [] => "no assertions failed".to_string(),
            [single] => format!("assertion failed: {}", single),
            many => {
                let mut message = String::from("assertions failed: ");
                for failure in many {
                    message.push_str("|n - ");
                    message.push_str(failure);
                }
                message
            }
        }
    }

    /// Failures collected so far, in call order
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn is_finalized(&self) -> bool {
        self.verdict.is_some()
    }

    /// Verdict of the first finalization, if it happened
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_without_failures_passes() {
        let mut logger = AssertionLogger::positive();
        assert_eq!(logger.finalize(), Ok(()));
        assert_eq!(logger.verdict(), Some(&Verdict::Passed));
    }

    #[test]
    fn test_positive_single_failure_message() {
        let mut logger = AssertionLogger::positive();
        assert!(logger.log("1 + 1 == 3", false).is_ok());

        let abort = logger.finalize().unwrap_err();
        assert_eq!(
            abort.verdict(),
            &Verdict::Failed(AssertionError::AssertionsFailed {
                count: 1,
                message: "assertion failed: 1 + 1 == 3".to_string(),
            })
        );
    }

    #[test]
    fn test_positive_multiple_failures_message() {
        let mut logger = AssertionLogger::positive();
        let _ = logger.log("a", false);
        let _ = logger.log("b", false);

        let abort = logger.finalize().unwrap_err();
        assert_eq!(abort.to_string(), "assertions failed: |n - a|n - b");
    }

    #[test]
    fn test_critical_log_finalizes() {
        let mut logger = AssertionLogger::positive();
        let abort = logger.log("x", true).unwrap_err();
        assert!(logger.is_finalized());
        assert!(!abort.is_expected_exit());
    }

    #[test]
    fn test_sealed_after_finalize() {
        let mut logger = AssertionLogger::new(Polarity::Negative, 1);
        let first = logger.log("x", true).unwrap_err();
        assert!(first.is_expected_exit());

        // A swallowed abort cannot change the outcome
        assert!(logger.log("y", false).is_ok());
        assert_eq!(logger.log("z", true).unwrap_err(), first);
        assert_eq!(logger.failures(), ["x".to_string()]);
    }

    #[test]
    fn test_negative_unconstrained() {
        let mut logger = AssertionLogger::new(Polarity::Negative, 0);
        let _ = logger.log("x", false);
        assert!(logger.finalize().unwrap_err().is_expected_exit());

        let mut untouched = AssertionLogger::new(Polarity::Negative, 0);
        let abort = untouched.finalize().unwrap_err();
        assert_eq!(
            abort.to_string(),
            "negative test conditions not met (0 assertions failed); no assertions failed"
        );
    }

    #[test]
    fn test_negative_count_mismatch_message() {
        let mut logger = AssertionLogger::new(Polarity::Negative, 2);
        let _ = logger.log("0 == 1", false);

        let abort = logger.finalize().unwrap_err();
        assert_eq!(
            abort.to_string(),
            "negative test conditions not met (2 assertions expected to fail, 1 assertions failed); assertion failed: 0 == 1"
        );
    }
}
