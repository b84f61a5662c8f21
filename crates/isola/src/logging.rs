//! Diagnostic logging setup
//!
//! Framework diagnostics go to stderr; stdout belongs to reporters and, in an
//! isolated child, to the protocol.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "ISOLA_LOG";

/// Install the stderr subscriber
///
/// `ISOLA_LOG` takes precedence; otherwise the level is `warn`, or `error`
/// with `errors_only`. Calling this more than once is harmless.
pub fn init(errors_only: bool) {
    let default_level = if errors_only { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
        tracing::warn!("logging initialized twice");
    }
}
