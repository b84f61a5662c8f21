use std::process::ExitCode;

fn main() -> ExitCode {
    isola::main(isola_selftest::SUITES)
}
