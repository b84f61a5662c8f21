//! Command-line entry point shared by every test binary
//!
//! A test binary hands its suite definitions to [`main`]:
//!
//! ```no_run
//! use isola::{require, Outcome, RegistryError, SuiteRegistry};
//!
//! fn math(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
//!     registry.suite("math", |s| {
//!         s.test("add", || -> Outcome {
//!             require!(1 + 1 == 2);
//!             Ok(())
//!         })
//!     })
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     isola::main(&[math])
//! }
//! ```

use crate::error::{self, Error, Result};
use crate::logging;
use crate::panics;
use crate::registry::{Definition, SuiteRegistry};
use crate::reporter::{CombinedReporter, ReporterOptions};
use crate::runner::{QualifiedPath, Runner};
use crate::status::Status;
use clap::Parser;
use isola_config::{ConfigLoader, RunnerSettings};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

/// Exit code when every test passed
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when at least one test did not pass
pub const EXIT_FAILURE: u8 = 1;

/// Test binary built on the isola framework.
///
/// Without --test, every registered test runs in its own child process.
///
/// EXAMPLES:
///     tests                         Run all tests, one at a time
///     tests -j 8 -l 30              Eight workers, 30 second timeout
///     tests -t math/add             Run one test in this process
///     tests -f math/add             Run one test, isolated
///     tests -r teamcity -r json     Combine two reporters
///
/// ENVIRONMENT VARIABLES:
///     ISOLA_TASKS       Default worker count
///     ISOLA_TIMEOUT     Default per-test timeout in seconds
///     ISOLA_REPORTERS   Comma-separated default reporters
///     ISOLA_QUIET       Set to '1' to disable the default reporter
///     ISOLA_LOG         Diagnostic log filter (default: warn)
///     NO_COLOR          Set to disable colored output
#[derive(Parser, Debug, Clone, Default)]
#[command(version)]
pub struct Args {
    /// Run exactly this test in this process
    #[arg(long, short = 't', value_name = "SUITE/.../TEST")]
    pub test: Option<String>,

    /// Run only this test, isolated like a full run
    #[arg(long, short = 'f', value_name = "SUITE/.../TEST", conflicts_with = "test")]
    pub filter: Option<String>,

    /// Reporter to use; repeat to combine (console, teamcity, json, subprocess)
    #[arg(long = "reporter", short = 'r', value_name = "NAME")]
    pub reporters: Vec<String>,

    /// Number of worker threads
    #[arg(long, short = 'j', value_name = "N")]
    pub tasks: Option<usize>,

    /// Per-test timeout in seconds
    #[arg(long, short = 'l', value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Only show errors and the summary
    #[arg(long, short = 'e')]
    pub error: bool,

    /// Disable the default reporter
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// The command-line layer of the runner settings
    pub fn settings(&self) -> RunnerSettings {
        RunnerSettings {
            tasks: self.tasks,
            timeout: self.timeout,
            reporters: (!self.reporters.is_empty()).then(|| self.reporters.clone()),
            quiet: self.quiet.then_some(true),
            errors_only: self.error.then_some(true),
            no_color: self.no_color.then_some(true),
        }
    }
}

/// Reporter names to build: the configured ones, or `console` unless quiet
fn reporter_names(settings: &RunnerSettings) -> Vec<String> {
    match settings.reporters() {
        [] if settings.quiet() => Vec::new(),
        [] => vec!["console".to_string()],
        names => names.to_vec(),
    }
}

/// Parse the command line, build the registry and run
pub fn main(definitions: &[Definition]) -> ExitCode {
    let args = Args::parse();
    if args.test.is_some() {
        panics::install_capturing_hook();
    }

    match load_settings(&args).and_then(|settings| {
        logging::init(settings.errors_only());
        if settings.no_color() {
            colored::control::set_override(false);
        }

        let registry = SuiteRegistry::from_definitions(definitions)?;
        run(&args, &registry, &settings)
    }) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::from(error::FATAL_EXIT_CODE as u8)
        }
    }
}

/// Merge configuration files, environment, and command line
fn load_settings(args: &Args) -> Result<RunnerSettings> {
    let directory = std::env::current_dir()?;
    let mut settings = ConfigLoader::new().load_from_directory(&directory)?.settings;
    settings.merge(&args.settings());
    settings.validate()?;
    Ok(settings)
}

/// Run the registered tests as selected by `args`; returns the exit code
pub fn run(args: &Args, registry: &SuiteRegistry, settings: &RunnerSettings) -> Result<u8> {
    let options = ReporterOptions {
        color: !settings.no_color(),
        errors_only: settings.errors_only(),
    };
    let reporter = CombinedReporter::from_names(&reporter_names(settings), options)?;

    let single = match args.test.as_deref() {
        Some(name) if !name.contains('/') => {
            if !settings.quiet() {
                return Err(Error::InvalidTestName(name.to_string()));
            }
            print!("{}", Status::NotFound.code());
            io::stdout().flush()?;
            return Ok(EXIT_FAILURE);
        }
        Some(name) => Some(QualifiedPath::parse(name)?),
        None => None,
    };

    let filter = args.filter.as_deref().map(QualifiedPath::parse).transpose()?;

    let runner = Runner::new(registry, Box::new(reporter))
        .with_tasks(settings.tasks())
        .with_timeout(Duration::from_secs(settings.timeout()));

    match &single {
        Some(path) => {
            runner.run_single(path);
        }
        None => {
            runner.run(filter.as_ref())?;
        }
    }

    runner.reporter().lock().finish();

    if runner.passed() == runner.total() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILURE)
    }
}
