//! Fixture binary whose tests pass, fail, crash and hang on purpose

use std::process::ExitCode;

fn main() -> ExitCode {
    isola::main(isola_selftest::demo::DEMO)
}
