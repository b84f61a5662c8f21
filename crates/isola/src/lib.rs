//! Isola - a test framework that runs every test case in its own process
//!
//! Test binaries register suites and test cases once at startup, then hand
//! control to [`main`]. A full run re-executes the binary once per test, so a
//! crash or a hang is contained to the test that caused it and reported as
//! such. Inside a test body, assertions come in two flavours:
//!
//! - `check!` and friends record a failure and keep going
//! - `require!` and friends record a failure and stop the body
//!
//! Negative tests invert the contract: they pass when they fail a given
//! number of assertions (or any non-zero number).
//!
//! ```no_run
//! use isola::{check, require, Outcome, RegistryError, SuiteRegistry};
//!
//! fn arithmetic(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
//!     registry.suite("arithmetic", |s| {
//!         s.test("addition", || -> Outcome {
//!             require!(1 + 1 == 2);
//!             Ok(())
//!         })?;
//!         s.negative_test_n("detects wrong sums", 2, || -> Outcome {
//!             check!(1 + 1 == 3);
//!             check!(2 + 2 == 5);
//!             Ok(())
//!         })
//!     })
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     isola::main(&[arithmetic])
//! }
//! ```

#[macro_use]
pub mod macros;

pub mod assertion;
pub mod cli;
pub mod context;
pub mod error;
pub mod logging;
pub mod panics;
pub mod process;
pub mod protocol;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod status;
pub mod suite;
pub mod testcase;

pub use assertion::{Abort, AssertionError, AssertionLogger, Outcome, Polarity, Verdict};
pub use cli::{main, Args};
pub use error::{Error, Result};
pub use registry::{Definition, RegistryError, SuiteRegistry, SuiteScope};
pub use reporter::{Reporter, SharedReporter};
pub use runner::{QualifiedPath, Runner};
pub use status::{Status, TestResult, TestsSummary};
pub use suite::Suite;
pub use testcase::{TestCase, TestFailure};

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
