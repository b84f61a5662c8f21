//! Framework-level errors
//!
//! Everything here is a misuse of the harness or a broken child process,
//! never a test outcome. Test outcomes travel as [`TestResult`](crate::TestResult)s.

use crate::context::UsageError;
use crate::protocol::ProtocolError;
use crate::registry::RegistryError;
use isola_config::ConfigError;
use thiserror::Error;

/// Exit code of the process when the framework itself fails
pub const FATAL_EXIT_CODE: i32 = 2;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid test name `{0}`; expected `suite/.../test`")]
    InvalidTestName(String),

    #[error("unknown reporter `{0}`")]
    UnknownReporter(String),

    #[error("failed to spawn isolated test process for `{test}`: {source}")]
    Spawn {
        test: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start the worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Report a framework-fatal error and terminate the process
pub fn fatal(err: &dyn std::error::Error) -> ! {
    tracing::error!("{}", err);
    eprintln!("fatal error: {}", err);
    std::process::exit(FATAL_EXIT_CODE)
}
