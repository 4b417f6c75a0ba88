//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing with standard configuration at `info` level
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing with the given default level.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // try_init: a second initialization (tests, embedding) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}
