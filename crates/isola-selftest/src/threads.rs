//! Assertions made from threads the body spawns

use isola::context;
use isola::{check, require, Outcome, RegistryError, SuiteRegistry};
use std::thread;

/// Run `body` on a scoped thread bound to the calling thread's context
fn on_bound_thread(body: impl FnOnce() -> Outcome + Send) -> bool {
    let handle = context::current();
    thread::scope(|scope| {
        scope
            .spawn(move || {
                let _bound = handle.map(|handle| handle.bind());
                body()
            })
            .join()
            .is_ok()
    })
}

pub fn secondary_threads(registry: &mut SuiteRegistry) -> Result<(), RegistryError> {
    registry.suite("contexts", |s| {
        s.suite("secondary threads", |s| {
            s.test("body thread has a context", || -> Outcome {
                require!(context::current().is_some());
                Ok(())
            })?;

            s.test("passing checks from a bound thread", || -> Outcome {
                let joined = on_bound_thread(|| {
                    check!(1 + 1 == 2);
                    Ok(())
                });
                require!(joined);
                Ok(())
            })?;

            s.negative_test_n("failures from a bound thread count", 2, || -> Outcome {
                let joined = on_bound_thread(|| {
                    check!(1 + 1 == 3);
                    Ok(())
                });
                check!(joined);
                check!(2 + 2 == 5);
                Ok(())
            })?;

            s.negative_test_n("require from a bound thread finalizes the test", 1, || -> Outcome {
                let joined = on_bound_thread(|| {
                    require!(1 + 1 == 3);
                    Ok(())
                });
                // Sealed by the other thread; these are ignored
                check!(!joined);
                check!(2 + 2 == 5);
                Ok(())
            })?;

            s.test("binding is undone when the guard drops", || -> Outcome {
                let handle = context::current();
                let unbound_after = thread::scope(|scope| {
                    scope
                        .spawn(move || {
                            drop(handle.map(|handle| handle.bind()));
                            context::current().is_none()
                        })
                        .join()
                        .unwrap_or(false)
                });
                require!(unbound_after);
                Ok(())
            })
        })
    })
}
