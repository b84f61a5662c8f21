//! Assertion macros
//!
//! Each assertion comes in two flavours: `check_*` records a failure and lets
//! the body continue, `require_*` records it and stops the body. Both expand to
//! an expression ending in `?`, so they can only be used in functions that
//! return [`Outcome`](crate::Outcome).

use crate::assertion::Outcome;
use crate::context::log_assertion;
use crate::panics;
use std::any::Any;

/// Evaluate an assertion body
///
/// `Err(detail)` is a failed assertion; `detail` is appended to the
/// description. A panic while evaluating is always critical.
#[doc(hidden)]
pub fn evaluate(
    description: &str,
    critical: bool,
    assertion: impl FnOnce() -> Result<(), String>,
) -> Outcome {
    match panics::catch(assertion) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(detail)) if detail.is_empty() => log_assertion(description, critical),
        Ok(Err(detail)) => log_assertion(format!("{} {}", description, detail), critical),
        Err(_) => log_assertion(format!("{} has panicked unexpectedly", description), true),
    }
}

#[doc(hidden)]
pub fn expect_panic(description: &str, critical: bool, body: impl FnOnce()) -> Outcome {
    match panics::catch(body) {
        Ok(()) => log_assertion(
            format!("{} should have panicked, but didn't", description),
            critical,
        ),
        Err(_) => Ok(()),
    }
}

#[doc(hidden)]
pub fn expect_panic_with<T: Any>(
    description: &str,
    type_name: &str,
    critical: bool,
    body: impl FnOnce(),
) -> Outcome {
    match panics::catch(body) {
        Ok(()) => log_assertion(
            format!(
                "{} should have panicked with {}, but didn't panic at all",
                description, type_name
            ),
            critical,
        ),
        Err(payload) if payload.is::<T>() => Ok(()),
        Err(_) => log_assertion(
            format!(
                "{} should have panicked with {}, but panicked with something else",
                description, type_name
            ),
            critical,
        ),
    }
}

#[doc(hidden)]
pub fn expect_no_panic(description: &str, critical: bool, body: impl FnOnce()) -> Outcome {
    match panics::catch(body) {
        Ok(()) => Ok(()),
        Err(_) => log_assertion(format!("{} shouldn't have panicked", description), critical),
    }
}

/// Non-fatal boolean assertion
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        $crate::macros::evaluate(::core::stringify!($cond), false, || {
            if $cond { Ok(()) } else { Err(::std::string::String::new()) }
        })?
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::macros::evaluate(::core::stringify!($cond), false, || {
            if $cond { Ok(()) } else { Err(::std::format!(": {}", ::std::format_args!($($arg)+))) }
        })?
    };
}

/// Fatal boolean assertion
#[macro_export]
macro_rules! require {
    ($cond:expr $(,)?) => {
        $crate::macros::evaluate(::core::stringify!($cond), true, || {
            if $cond { Ok(()) } else { Err(::std::string::String::new()) }
        })?
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::macros::evaluate(::core::stringify!($cond), true, || {
            if $cond { Ok(()) } else { Err(::std::format!(": {}", ::std::format_args!($($arg)+))) }
        })?
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __assert_eq {
    ($critical:expr, $left:expr, $right:expr) => {
        $crate::macros::evaluate(
            ::core::concat!(::core::stringify!($left), " == ", ::core::stringify!($right)),
            $critical,
            || match (&$left, &$right) {
                (left, right) if *left == *right => Ok(()),
                (left, right) => Err(::std::format!("(left: {:?}, right: {:?})", left, right)),
            },
        )?
    };
}

/// Non-fatal equality assertion
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::__assert_eq!(false, $left, $right)
    };
}

/// Fatal equality assertion
#[macro_export]
macro_rules! require_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::__assert_eq!(true, $left, $right)
    };
}

/// Non-fatal: the expression must panic
#[macro_export]
macro_rules! check_panics {
    ($($body:tt)+) => {
        $crate::macros::expect_panic(::core::stringify!($($body)+), false, || {
            let _ = { $($body)+ };
        })?
    };
}

/// Fatal: the expression must panic
#[macro_export]
macro_rules! require_panics {
    ($($body:tt)+) => {
        $crate::macros::expect_panic(::core::stringify!($($body)+), true, || {
            let _ = { $($body)+ };
        })?
    };
}

/// Non-fatal: the expression must panic with a payload of type `T`
#[macro_export]
macro_rules! check_panics_with {
    ($ty:ty, $($body:tt)+) => {
        $crate::macros::expect_panic_with::<$ty>(
            ::core::stringify!($($body)+),
            ::core::stringify!($ty),
            false,
            || {
                let _ = { $($body)+ };
            },
        )?
    };
}

/// Fatal: the expression must panic with a payload of type `T`
#[macro_export]
macro_rules! require_panics_with {
    ($ty:ty, $($body:tt)+) => {
        $crate::macros::expect_panic_with::<$ty>(
            ::core::stringify!($($body)+),
            ::core::stringify!($ty),
            true,
            || {
                let _ = { $($body)+ };
            },
        )?
    };
}

/// Non-fatal: the expression must not panic
#[macro_export]
macro_rules! check_no_panic {
    ($($body:tt)+) => {
        $crate::macros::expect_no_panic(::core::stringify!($($body)+), false, || {
            let _ = { $($body)+ };
        })?
    };
}

/// Fatal: the expression must not panic
#[macro_export]
macro_rules! require_no_panic {
    ($($body:tt)+) => {
        $crate::macros::expect_no_panic(::core::stringify!($($body)+), true, || {
            let _ = { $($body)+ };
        })?
    };
}

#[cfg(test)]
mod tests {
    use crate::assertion::{AssertionError, AssertionLogger, Outcome, Polarity, Verdict};
    use crate::context;

    fn run(
        polarity: Polarity,
        expected: usize,
        body: impl FnOnce() -> Outcome,
    ) -> (Verdict, Vec<String>) {
        let installed = context::install(AssertionLogger::new(polarity, expected));
        let verdict = match body() {
            Ok(()) => match installed.finalize() {
                Ok(()) => Verdict::Passed,
                Err(abort) => abort.verdict().clone(),
            },
            Err(abort) => abort.verdict().clone(),
        };
        let failures = installed.with(|logger| logger.failures().to_vec());
        (verdict, failures)
    }

    #[test]
    fn test_check_continues() {
        let mut reached = false;
        let (verdict, failures) = run(Polarity::Positive, 0, || {
            check!(1 + 1 == 3);
            reached = true;
            Ok(())
        });

        assert!(reached);
        assert_eq!(failures, vec!["1 + 1 == 3".to_string()]);
        assert!(matches!(
            verdict,
            Verdict::Failed(AssertionError::AssertionsFailed { count: 1, .. })
        ));
    }

    #[test]
    fn test_require_stops() {
        let mut reached = false;
        let (verdict, _) = run(Polarity::Positive, 0, || {
            require!(0 == 1);
            reached = true;
            Ok(())
        });

        assert!(!reached);
        assert!(!verdict.is_pass());
    }

    #[test]
    fn test_check_with_message() {
        let (_, failures) = run(Polarity::Positive, 0, || {
            let limit = 3;
            check!(limit > 5, "limit was {}", limit);
            Ok(())
        });

        assert_eq!(failures, vec!["limit > 5: limit was 3".to_string()]);
    }

    #[test]
    fn test_check_eq_reports_both_sides() {
        let (_, failures) = run(Polarity::Positive, 0, || {
            let items = vec![1, 2];
            check_eq!(items.len(), 3);
            check_eq!(items[0], 1);
            Ok(())
        });

        assert_eq!(
            failures,
            vec!["items.len() == 3 (left: 2, right: 3)".to_string()]
        );
    }

    #[test]
    fn test_panicking_check_is_critical() {
        let mut reached = false;
        let (verdict, failures) = run(Polarity::Negative, 0, || {
            check!(Option::<u8>::None.unwrap() == 1);
            reached = true;
            Ok(())
        });

        assert!(!reached);
        assert_eq!(verdict, Verdict::ExpectedExit);
        assert!(failures[0].ends_with("has panicked unexpectedly"));
    }

    #[test]
    fn test_panic_assertions() {
        let (verdict, failures) = run(Polarity::Positive, 0, || {
            check_panics!(panic!("expected"));
            check_panics_with!(&str, panic!("typed"));
            check_panics_with!(u32, std::panic::panic_any(7_u32));
            check_no_panic!(Some(1).unwrap());
            require_no_panic!(vec![1, 2, 3].len());
            Ok(())
        });

        assert_eq!(verdict, Verdict::Passed);
        assert!(failures.is_empty());
    }

    #[test]
    fn test_failed_panic_assertions() {
        let (_, failures) = run(Polarity::Negative, 3, || {
            check_panics!(1 + 1);
            check_panics_with!(u32, panic!("text"));
            check_no_panic!(panic!("oops"));
            Ok(())
        });

        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0], "1 + 1 should have panicked, but didn't");
        assert!(failures[1]
            .ends_with("should have panicked with u32, but panicked with something else"));
        assert!(failures[2].ends_with("shouldn't have panicked"));
    }
}
