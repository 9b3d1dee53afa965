//! Logging setup.
//!
//! All logs are written to **stderr**: stdout carries the handshake line the
//! host waits for.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: overrides the level given on the command line
//!   (e.g. `debug`, `hemmer_provider_alwaysdata=trace`)
//!
//! ```bash
//! # Trace the data source reads only
//! RUST_LOG=warn,hemmer_provider_alwaysdata::data_source=trace ./hemmer-provider-alwaysdata
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter: `RUST_LOG` when set, `default_level` otherwise.
///
/// An unparsable `default_level` falls back to `info`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the global subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Install the global subscriber, returning false if one was already set.
pub fn try_init_logging(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}
