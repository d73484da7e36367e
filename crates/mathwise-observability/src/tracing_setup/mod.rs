//! Tracing setup: JSON structured logging filtered by `MATHWISE_LOG`.

pub mod events;

use mathwise_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber with structured JSON output.
///
/// Respects `MATHWISE_LOG`; defaults to `info`. Calling it again after a
/// subscriber is installed is a no-op.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("MATHWISE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init();
}

/// Install the subscriber described by `config`; `MATHWISE_LOG` still wins.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env("MATHWISE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .try_init();
}
