//! Runner - traverses the suite tree and drives the reporter
//!
//! Two modes:
//! - **single test** ([`Runner::run_single`]): look a test up by path and
//!   invoke it in this process. This is what an isolated child does.
//! - **full run** ([`Runner::run`]): re-run every test in its own child
//!   process, with a per-test timeout, on a bounded worker pool.
//!
//! With one worker the tests run inline and in registration order. Suite
//! events are emitted once per suite boundary and each test is announced
//! before its child is spawned. With more, every test's events
//! (ancestor suites entered, test started, output, test finished, suites left)
//! are delivered as one batch under the reporter's lock.

mod isolated;
mod path;

pub use path::QualifiedPath;

use crate::error::{Error, Result};
use crate::registry::SuiteRegistry;
use crate::reporter::{Reporter, SharedReporter};
use crate::status::{Status, TestResult, TestsSummary};
use crate::suite::Suite;
use crate::testcase::TestCase;
use isolated::IsolatedRun;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Per-test timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(isola_config::DEFAULT_TIMEOUT_SECS);

pub struct Runner<'r> {
    registry: &'r SuiteRegistry,
    reporter: SharedReporter,
    tasks: usize,
    timeout: Duration,
    /// Test binary for isolated runs; the running executable when unset
    program: Option<PathBuf>,
    passed: AtomicUsize,
    total: AtomicUsize,
    failed: Mutex<Vec<(Status, String)>>,
    fatal: Mutex<Option<Error>>,
    wall_clock: Mutex<Duration>,
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r SuiteRegistry, reporter: Box<dyn Reporter + Send>) -> Self {
        Self {
            registry,
            reporter: SharedReporter::new(reporter),
            tasks: isola_config::DEFAULT_TASKS,
            timeout: DEFAULT_TIMEOUT,
            program: None,
            passed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            failed: Mutex::new(Vec::new()),
            fatal: Mutex::new(None),
            wall_clock: Mutex::new(Duration::ZERO),
        }
    }

    /// Set the number of worker threads (at least one)
    pub fn with_tasks(mut self, tasks: usize) -> Self {
        self.tasks = tasks.max(1);
        self
    }

    /// Set the per-test timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run isolated tests through `program` instead of the running executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn reporter(&self) -> &SharedReporter {
        &self.reporter
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn passed(&self) -> usize {
        self.passed.load(Ordering::SeqCst)
    }

    /// Aggregate of everything run so far
    pub fn summary(&self) -> TestsSummary {
        TestsSummary {
            failed_tests: self
                .failed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            passed: self.passed(),
            total: self.total(),
            wall_clock: *self.wall_clock.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn record(&self, result: &TestResult, qualified: String) {
        if result.is_pass() {
            self.passed.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((result.status, qualified));
        }
    }

    fn set_fatal(&self, err: Error) {
        tracing::error!("{}", err);
        let mut fatal = self.fatal.lock().unwrap_or_else(PoisonError::into_inner);
        if fatal.is_none() {
            *fatal = Some(err);
        }
    }

    fn has_fatal(&self) -> bool {
        self.fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn take_fatal(&self) -> Option<Error> {
        self.fatal.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn set_wall_clock(&self, elapsed: Duration) {
        *self.wall_clock.lock().unwrap_or_else(PoisonError::into_inner) = elapsed;
    }

    fn find_test(&self, path: &QualifiedPath) -> Option<&'r TestCase> {
        self.registry.find(&path.suite_path())?.test(path.test())
    }

    /// Run one test in this process and report it
    ///
    /// A path that does not resolve runs nothing: `total` stays zero and
    /// only the summary is reported.
    pub fn run_single(&self, path: &QualifiedPath) -> TestsSummary {
        let started_at = Instant::now();

        if let Some(test) = self.find_test(path) {
            self.total.fetch_add(1, Ordering::SeqCst);
            self.reporter.lock().test_started(test);

            let begin = Instant::now();
            let result = match test.invoke() {
                Ok(()) => TestResult::new(test.name(), Status::Passed),
                Err(failure) => TestResult::new(test.name(), Status::Failed)
                    .with_description(failure.to_string()),
            }
            .with_duration(begin.elapsed());

            self.record(&result, path.to_string());
            self.reporter.lock().test_finished(&result);
        } else {
            tracing::debug!(test = %path, "test not found");
        }

        self.set_wall_clock(started_at.elapsed());
        let summary = self.summary();
        self.reporter.lock().summary(&summary);
        summary
    }

    /// Run every test (or only `filter`) in isolated child processes
    ///
    /// Stops starting new children after the first framework-fatal error and
    /// returns it once running work has drained.
    pub fn run(&self, filter: Option<&QualifiedPath>) -> Result<TestsSummary> {
        let started_at = Instant::now();

        if self.tasks == 1 {
            let mut stack = Vec::new();
            for suite in self.registry.suites() {
                self.visit_inline(suite, &mut stack, filter);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.tasks)
                .thread_name(|index| format!("isola-worker-{}", index))
                .build()?;

            pool.scope(|scope| {
                let mut stack = Vec::new();
                for suite in self.registry.suites() {
                    self.visit_pooled(scope, suite, &mut stack, filter);
                }
            });
        }

        if let Some(err) = self.take_fatal() {
            return Err(err);
        }

        self.set_wall_clock(started_at.elapsed());
        let summary = self.summary();
        self.reporter.lock().summary(&summary);
        Ok(summary)
    }

    fn visit_inline(
        &self,
        suite: &'r Suite,
        stack: &mut Vec<&'r Suite>,
        filter: Option<&QualifiedPath>,
    ) {
        stack.push(suite);
        let names = suite_names(stack);

        if filter.map_or(true, |path| path.could_contain(&names[..])) {
            self.reporter.lock().suite_started(suite);

            for child in suite.suites() {
                self.visit_inline(child, stack, filter);
            }

            for test in suite.tests() {
                if self.has_fatal() {
                    break;
                }
                if filter.map_or(false, |path| !path.matches(&names[..], test.name())) {
                    continue;
                }

                self.total.fetch_add(1, Ordering::SeqCst);
                let qualified = qualified_name(&names, test.name());
                // Announced before the child runs
                self.reporter.lock().test_started(test);
                match self.isolated(&qualified).execute(test) {
                    Ok(outcome) => {
                        {
                            let mut reporter = self.reporter.lock();
                            for line in &outcome.output {
                                reporter.test_output(line);
                            }
                            reporter.test_finished(&outcome.result);
                        }
                        self.record(&outcome.result, qualified);
                    }
                    Err(err) => self.set_fatal(err),
                }
            }

            self.reporter.lock().suite_finished(suite);
        }

        stack.pop();
    }

    fn visit_pooled<'s>(
        &'s self,
        scope: &rayon::Scope<'s>,
        suite: &'r Suite,
        stack: &mut Vec<&'r Suite>,
        filter: Option<&'s QualifiedPath>,
    ) {
        stack.push(suite);
        let names = suite_names(stack);

        if filter.map_or(true, |path| path.could_contain(&names[..])) {
            for child in suite.suites() {
                self.visit_pooled(scope, child, stack, filter);
            }

            for test in suite.tests() {
                if filter.map_or(false, |path| !path.matches(&names[..], test.name())) {
                    continue;
                }

                self.total.fetch_add(1, Ordering::SeqCst);
                let ancestors = stack.clone();
                let qualified = qualified_name(&names, test.name());

                scope.spawn(move |_| {
                    if self.has_fatal() {
                        return;
                    }

                    match self.isolated(&qualified).execute(test) {
                        Ok(outcome) => {
                            {
                                let mut reporter = self.reporter.lock();
                                for suite in &ancestors {
                                    reporter.suite_started(suite);
                                }
                                reporter.test_started(test);
                                for line in &outcome.output {
                                    reporter.test_output(line);
                                }
                                reporter.test_finished(&outcome.result);
                                for suite in ancestors.iter().rev() {
                                    reporter.suite_finished(suite);
                                }
                            }
                            self.record(&outcome.result, qualified);
                        }
                        Err(err) => self.set_fatal(err),
                    }
                });
            }
        }

        stack.pop();
    }

    fn isolated(&self, qualified: &str) -> IsolatedRun {
        IsolatedRun::new(self.program.clone(), qualified, self.timeout)
    }
}

fn suite_names<'a>(stack: &[&'a Suite]) -> Vec<&'a str> {
    stack.iter().map(|suite| suite.name()).collect()
}

fn qualified_name(suites: &[&str], test: &str) -> String {
    format!("{}/{}", suites.join("/"), test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check, require};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Events(Arc<Mutex<Vec<String>>>);

    impl Reporter for Events {
        fn suite_started(&mut self, suite: &Suite) {
            self.0.lock().unwrap().push(format!("enter {}", suite.name()));
        }
        fn suite_finished(&mut self, suite: &Suite) {
            self.0.lock().unwrap().push(format!("leave {}", suite.name()));
        }
        fn test_started(&mut self, test: &TestCase) {
            self.0.lock().unwrap().push(format!("start {}", test.name()));
        }
        fn test_finished(&mut self, result: &TestResult) {
            self.0
                .lock()
                .unwrap()
                .push(format!("finish {} {}", result.name, result.status));
        }
        fn summary(&mut self, summary: &TestsSummary) {
            self.0
                .lock()
                .unwrap()
                .push(format!("summary {}/{}", summary.passed, summary.total));
        }
    }

    fn registry() -> SuiteRegistry {
        let mut registry = SuiteRegistry::new();
        registry
            .suite("math", |s| {
                s.test("add", || {
                    require!(1 + 1 == 2);
                    Ok(())
                })?;
                s.test("bad", || {
                    check!(1 + 1 == 3);
                    Ok(())
                })
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_run_single_passed() {
        let registry = registry();
        let events = Events::default();
        let runner = Runner::new(&registry, Box::new(events.clone()));

        let summary = runner.run_single(&QualifiedPath::parse("math/add").unwrap());

        assert_eq!(summary.total, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(
            *events.0.lock().unwrap(),
            vec!["start add", "finish add PASSED", "summary 1/1"]
        );
    }

    #[test]
    fn test_run_single_failed_keeps_description() {
        let registry = registry();
        let runner = Runner::new(&registry, Box::new(Events::default()));

        let summary = runner.run_single(&QualifiedPath::parse("math/bad").unwrap());

        assert_eq!(summary.passed, 0);
        assert_eq!(
            summary.failed_tests,
            vec![(Status::Failed, "math/bad".to_string())]
        );
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_run_single_not_found() {
        let registry = registry();
        let events = Events::default();
        let runner = Runner::new(&registry, Box::new(events.clone()));

        for path in ["math/nosuch", "nosuch/test", "math/add/deeper"] {
            let summary = runner.run_single(&QualifiedPath::parse(path).unwrap());
            assert_eq!(summary.total, 0);
        }
        assert_eq!(runner.total(), 0);
        assert_eq!(*events.0.lock().unwrap(), vec!["summary 0/0"; 3]);
    }

    #[test]
    fn test_spawn_failure_is_fatal() {
        let registry = registry();
        let runner = Runner::new(&registry, Box::new(Events::default()))
            .with_program("/nonexistent/isola-binary");

        assert!(matches!(runner.run(None), Err(Error::Spawn { .. })));
    }
}
