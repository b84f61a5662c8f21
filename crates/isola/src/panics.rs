//! Panic capture for test bodies and assertion expressions

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Replace the default panic hook with one that records the panic instead of
/// printing it
///
/// The message is kept per thread, for the thread that panicked.
///
/// Used by the single-test entry point: expected panics stay silent and an
/// unexpected one keeps its location in the failure description.
pub fn install_capturing_hook() {
    panic::set_hook(Box::new(|info| {
        let message = match info.location() {
            Some(location) => format!(
                "{} (at {}:{})",
                payload_message(info.payload()),
                location.file(),
                location.line()
            ),
            None => payload_message(info.payload()),
        };
        LAST_PANIC.with(|last| *last.borrow_mut() = Some(message));
    }));
}

/// Take the message the capturing hook recorded on this thread, if any
pub fn take_recorded() -> Option<String> {
    LAST_PANIC.with(|last| last.borrow_mut().take())
}

/// Best-effort text of a panic payload
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run a closure, turning a panic into its payload
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Box<dyn Any + Send>> {
    panic::catch_unwind(AssertUnwindSafe(f))
}
