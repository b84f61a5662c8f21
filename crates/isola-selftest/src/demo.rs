//! Fixture suites for end-to-end runs
//!
//! | Test | Result |
//! |---|---|
//! | `math/add`, `math/negative` | passed |
//! | `math/bad` | failed |
//! | `process/crash`, `process/exit` | crashed |
//! | `process/hang` | timed out |
//! | `process/orphan` | timed out, leaves a `sleep` holding its stdout |
//! | `output/chatty` | passed, prints two lines |
//! | `output/braces` | passed, prints lines that look like directives |
//! | `panics/boom` | failed |
//! | `nested/outer/inner/deep` | passed |

use isola::{check, require, Definition, Outcome, RegistryError, SuiteRegistry};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

pub const DEMO: &[Definition] = &[math, process, output, panics, nested];

/// Tests that end up passed, out of everything in [`DEMO`]
pub const DEMO_PASSING: usize = 5;
pub const DEMO_TOTAL: usize = 11;

fn math(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("math", |s| {
        s.test("add", || -> Outcome {
            require!(1 + 1 == 2);
            Ok(())
        })?;
        s.test("bad", || -> Outcome {
            check!(1 + 1 == 3);
            check!(2 + 2 == 5);
            Ok(())
        })?;
        s.negative_test_n("negative", 1, || -> Outcome {
            check!(1 + 1 == 3);
            Ok(())
        })
    })
}

fn process(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("process", |s| {
        s.test("crash", || -> Outcome { std::process::abort() })?;
        s.test("exit", || -> Outcome { std::process::exit(0) })?;
        s.test("hang", || -> Outcome {
            loop {
                thread::sleep(Duration::from_millis(100));
            }
        })?;
        s.test("orphan", || -> Outcome {
            // Only stdout is shared with the sleeper
            let _sleeper = Command::new("sleep")
                .arg("20")
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            loop {
                thread::sleep(Duration::from_millis(100));
            }
        })
    })
}

fn output(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("output", |s| {
        s.test("chatty", || -> Outcome {
            println!("hello from the test");
            println!("second line");
            Ok(())
        })?;
        s.test("braces", || -> Outcome {
            println!("{{{{user}}}}");
            println!("{{{{failed}}}}");
            Ok(())
        })
    })
}

fn panics(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("panics", |s| {
        s.test("boom", || -> Outcome { panic!("boom") })
    })
}

fn nested(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("nested", |s| {
        s.suite("outer", |s| {
            s.suite("inner", |s| {
                s.test("deep", || -> Outcome {
                    require!("deep".len() == 4);
                    Ok(())
                })
            })
        })
    })
}
