//! Execution contexts - route assertions to the logger of the running test
//!
//! A process-wide table maps context ids to installed loggers, and thread ids
//! to the context they report into. Installing a logger binds the calling
//! thread; helper threads spawned by a test body can join the same context
//! with [`ContextHandle::bind`].
//!
//! ```no_run
//! use isola::{check, context, Outcome};
//!
//! fn body() -> Outcome {
//!     let handle = context::current().expect("inside a test");
//!     std::thread::spawn(move || -> Outcome {
//!         let _bound = handle.bind();
//!         check!(2 + 2 == 4);
//!         Ok(())
//!     })
//!     .join()
//!     .expect("helper thread")?;
//!     Ok(())
//! }
//! ```

use crate::assertion::{AssertionLogger, Outcome};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, ThreadId};
use thiserror::Error;

/// Identifier of one installed logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

/// Assertion used where no logger is installed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("assertion `{description}` was evaluated outside of a running test case")]
pub struct UsageError {
    pub description: String,
}

#[derive(Default)]
struct Contexts {
    loggers: HashMap<ContextId, AssertionLogger>,
    bindings: HashMap<ThreadId, ContextId>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn contexts() -> MutexGuard<'static, Contexts> {
    static CONTEXTS: OnceLock<Mutex<Contexts>> = OnceLock::new();
    CONTEXTS
        .get_or_init(|| Mutex::new(Contexts::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Guard owning an installed logger
///
/// Dropping it removes the logger and every thread binding to it, on every
/// exit path of the test invocation.
#[derive(Debug)]
pub struct InstalledLogger {
    id: ContextId,
}

/// Install a fresh logger and bind the calling thread to it
pub fn install(logger: AssertionLogger) -> InstalledLogger {
    let id = ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
    let mut contexts = contexts();
    contexts.loggers.insert(id, logger);
    contexts.bindings.insert(thread::current().id(), id);
    InstalledLogger { id }
}

impl InstalledLogger {
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Finalize the installed logger
    pub fn finalize(&self) -> Outcome {
        self.with(|logger| logger.finalize())
    }

    /// Run a closure against the installed logger
    pub fn with<R>(&self, f: impl FnOnce(&mut AssertionLogger) -> R) -> R {
        let mut contexts = contexts();
        match contexts.loggers.get_mut(&self.id) {
            Some(logger) => f(logger),
            // The entry lives exactly as long as this guard
            None => unreachable!("installed logger vanished from the context table"),
        }
    }
}

impl Drop for InstalledLogger {
    fn drop(&mut self) {
        let mut contexts = contexts();
        contexts.loggers.remove(&self.id);
        contexts.bindings.retain(|_, bound| *bound != self.id);
    }
}

/// Handle to a context that other threads can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHandle {
    id: ContextId,
}

/// Handle of the context bound to the calling thread
pub fn current() -> Option<ContextHandle> {
    contexts()
        .bindings
        .get(&thread::current().id())
        .map(|&id| ContextHandle { id })
}

impl ContextHandle {
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Route the calling thread's assertions into this context
    ///
    /// The binding is undone when the guard drops, restoring whatever the
    /// thread was bound to before.
    pub fn bind(&self) -> BoundContext {
        let thread = thread::current().id();
        let previous = contexts().bindings.insert(thread, self.id);
        BoundContext { thread, previous }
    }
}

/// Guard for a secondary thread binding
#[derive(Debug)]
pub struct BoundContext {
    thread: ThreadId,
    previous: Option<ContextId>,
}

impl Drop for BoundContext {
    fn drop(&mut self) {
        let mut contexts = contexts();
        match self.previous {
            Some(previous) => {
                contexts.bindings.insert(self.thread, previous);
            }
            None => {
                contexts.bindings.remove(&self.thread);
            }
        }
    }
}

/// Log an assertion failure into the calling thread's context
pub fn try_log_assertion(
    description: impl Into<String>,
    critical: bool,
) -> Result<Outcome, UsageError> {
    let description = description.into();
    let mut contexts = contexts();
    let Contexts { loggers, bindings } = &mut *contexts;

    let logger = bindings
        .get(&thread::current().id())
        .and_then(|id| loggers.get_mut(id));

    match logger {
        Some(logger) => Ok(logger.log(description, critical)),
        None => Err(UsageError { description }),
    }
}

/// Log an assertion failure; outside of a test case this aborts the process
///
/// An assertion without a logger means the harness itself is misused, so it
/// is never folded into a test result.
pub fn log_assertion(description: impl Into<String>, critical: bool) -> Outcome {
    match try_log_assertion(description, critical) {
        Ok(outcome) => outcome,
        Err(err) => crate::error::fatal(&err),
    }
}
