//! Logging setup for wkmigrate.
//!
//! Converters and the batch engine log through `tracing`; binaries call
//! [`init`] once at startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at INFO, overridable with RUST_LOG.
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific default level
///
/// `RUST_LOG` still wins when set. Output goes to stderr so migrated JSON
/// on stdout stays machine-readable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
