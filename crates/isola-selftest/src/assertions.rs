//! Assertion macros, positive and negative

use isola::{
    check, check_eq, check_no_panic, check_panics, check_panics_with, require, require_eq,
    require_no_panic, require_panics, require_panics_with, Outcome, RegistryError, SuiteRegistry,
};

fn does_not_panic() {}

fn panics_with_code() -> bool {
    std::panic::panic_any(1_i32)
}

fn panics_with_text() {
    panic!("text payload")
}

pub fn basic(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("assertions", |s| {
        s.suite("basic assertions", |s| {
            s.test("check", || -> Outcome {
                check!(1 + 1 == 2);
                check!(100 == 20 + 80);
                check!(!"abc".is_empty());
                Ok(())
            })?;

            s.test("require", || -> Outcome {
                require!(2 * 2 == 4);
                require!(!(3 < 1));
                Ok(())
            })?;

            s.test("check with message", || -> Outcome {
                let items = [1, 2, 3];
                check!(items.len() == 3, "got {} items", items.len());
                Ok(())
            })?;

            s.negative_test("failing check", || -> Outcome {
                check!(0 == 1);
                Ok(())
            })?;

            s.negative_test("failing require", || -> Outcome {
                require!(0 == 1);
                Ok(())
            })?;

            s.negative_test_n("multiple failing checks", 2, || -> Outcome {
                check!(0 == 1);
                check!(1 == 2);
                Ok(())
            })?;

            s.negative_test_n("multiple failing requires", 1, || -> Outcome {
                require!(0 == 1);
                require!(1 == 2);
                Ok(())
            })
        })
    })
}

pub fn equality(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("assertions", |s| {
        s.suite("equality assertions", |s| {
            s.test("check eq", || -> Outcome {
                check_eq!(2 + 2, 4);
                check_eq!("abc".to_uppercase(), "ABC");
                Ok(())
            })?;

            s.test("require eq", || -> Outcome {
                require_eq!(vec![1, 2].len(), 2);
                Ok(())
            })?;

            s.negative_test_n("failed check eq", 2, || -> Outcome {
                check_eq!(2 + 2, 5);
                check_eq!("a", "b");
                Ok(())
            })?;

            s.negative_test_n("failed require eq", 1, || -> Outcome {
                require_eq!(1, 2);
                require_eq!(3, 4);
                Ok(())
            })
        })
    })
}

pub fn panics(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("assertions", |s| {
        s.suite("panic assertions", |s| {
            s.test("check panics", || -> Outcome {
                check_panics!(panics_with_code());
                Ok(())
            })?;

            s.test("check panics with type", || -> Outcome {
                check_panics_with!(i32, panics_with_code());
                check_panics_with!(&'static str, panics_with_text());
                Ok(())
            })?;

            s.test("check no panic", || -> Outcome {
                check_no_panic!(does_not_panic());
                Ok(())
            })?;

            s.test("require panics", || -> Outcome {
                require_panics!(panics_with_code());
                Ok(())
            })?;

            s.test("require panics with type", || -> Outcome {
                require_panics_with!(i32, panics_with_code());
                Ok(())
            })?;

            s.test("require no panic", || -> Outcome {
                require_no_panic!(does_not_panic());
                Ok(())
            })?;

            s.negative_test("failed check panics", || -> Outcome {
                check_panics!(does_not_panic());
                Ok(())
            })?;

            s.negative_test("failed check panics with type", || -> Outcome {
                check_panics_with!(i32, does_not_panic());
                Ok(())
            })?;

            s.negative_test("check panics with the wrong type", || -> Outcome {
                check_panics_with!(String, panics_with_code());
                Ok(())
            })?;

            s.negative_test("failed check no panic", || -> Outcome {
                check_no_panic!(panics_with_code());
                Ok(())
            })?;

            s.negative_test("failed require panics", || -> Outcome {
                require_panics!(does_not_panic());
                Ok(())
            })?;

            s.negative_test("failed require panics with type", || -> Outcome {
                require_panics_with!(i32, does_not_panic());
                Ok(())
            })?;

            s.negative_test("failed require no panic", || -> Outcome {
                require_no_panic!(panics_with_code());
                Ok(())
            })
        })
    })
}

pub fn unchecked_panics(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("assertions", |s| {
        s.suite("unchecked panics", |s| {
            s.negative_test("panic from check", || -> Outcome {
                check!(panics_with_code());
                Ok(())
            })?;

            s.negative_test("panic from require", || -> Outcome {
                require!(panics_with_code());
                Ok(())
            })?;

            s.negative_test_n("panic from check stops the body", 1, || -> Outcome {
                check!(panics_with_code());
                check!(0 == 1);
                Ok(())
            })
        })
    })
}
