//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level. Output goes to
//! stderr so stdout stays free for reports.

use crate::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed, which is not an
/// error: tests and embedding hosts may set up their own.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
