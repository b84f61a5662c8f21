//! Registration of tests and suites

use isola::{require, require_eq, Outcome, RegistryError, Suite, SuiteRegistry, TestCase};

fn empty(name: &str) -> TestCase {
    TestCase::new(name, || Ok(()))
}

pub fn registration(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("registration", |s| {
        s.suite("registration of tests and suites", |s| {
            s.test("top-level suite", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require_eq!(registry.suites().len(), 1);
                require_eq!(registry.suites()[0].name(), "foobar");
                Ok(())
            })?;

            s.test("duplicate suite", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require_eq!(registry.suites().len(), 1);
                Ok(())
            })?;

            s.test("nested suite", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require!(registry.register_suite(Suite::new("foobaz"), "foobar").is_ok());
                require!(registry
                    .register_suite(Suite::new("fizzbuzz"), "foobar/foobaz")
                    .is_ok());
                require_eq!(registry.suites().len(), 1);

                let top = &registry.suites()[0];
                require_eq!(top.suites().len(), 1);
                require!(top.child("foobaz").is_some());
                require!(registry.find("foobar/foobaz/fizzbuzz").is_some());
                Ok(())
            })?;

            s.test("nested suite without existing parent", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(matches!(
                    registry.register_suite(Suite::new("foobaz"), "foobar"),
                    Err(RegistryError::UnknownParent { .. })
                ));
                Ok(())
            })?;

            s.test("test case", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require!(registry.register_test("foobar", empty("foobaz")).is_ok());
                require_eq!(registry.suites()[0].tests()[0].name(), "foobaz");

                require!(registry.register_suite(Suite::new("fizzbuzz"), "foobar").is_ok());
                require!(registry
                    .register_test("foobar/fizzbuzz", empty("barfoo"))
                    .is_ok());
                require_eq!(registry.suites()[0].suites()[0].tests()[0].name(), "barfoo");
                Ok(())
            })?;

            s.test("test case without existing parent", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(matches!(
                    registry.register_test("foobar", empty("barfoo")),
                    Err(RegistryError::UnknownSuite { .. })
                ));
                Ok(())
            })?;

            s.test("duplicate test case", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(registry.register_suite(Suite::new("foobar"), "").is_ok());
                require!(registry.register_test("foobar", empty("barfoo")).is_ok());
                require!(matches!(
                    registry.register_test("foobar", empty("barfoo")),
                    Err(RegistryError::DuplicateTestcase { .. })
                ));
                Ok(())
            })?;

            s.test("names may not contain a separator", || -> Outcome {
                let mut registry = SuiteRegistry::new();
                require!(matches!(
                    registry.register_suite(Suite::new("foo/bar"), ""),
                    Err(RegistryError::InvalidName { .. })
                ));
                Ok(())
            })
        })
    })
}
