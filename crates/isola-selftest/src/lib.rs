//! Suites exercising the framework through its own runner
//!
//! [`SUITES`] is what the `isola-selftest` binary runs; every test in it is
//! expected to pass. [`demo::DEMO`] is a fixture with tests that fail, crash
//! and hang on purpose.

pub mod assertions;
pub mod demo;
pub mod registration;
pub mod threads;

use isola::Definition;

/// Every self-test suite, in registration order
pub const SUITES: &[Definition] = &[
    assertions::basic,
    assertions::equality,
    assertions::panics,
    assertions::unchecked_panics,
    threads::secondary_threads,
    registration::registration,
];
