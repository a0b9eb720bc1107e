//! Logging setup for the provider binaries.
//!
//! All logs go to **stderr**; stdout carries the plugin handshake.
//!
//! # Environment Variables
//!
//! - `SONARR_PROVIDER_LOG`: filter for this provider, e.g. `debug` or
//!   `sonarr_provider::sonarr=debug`
//! - `RUST_LOG`: used when `SONARR_PROVIDER_LOG` is not set
//!
//! ```bash
//! # Log every Sonarr request
//! SONARR_PROVIDER_LOG=sonarr_provider::sonarr=debug ./terraform-provider-sonarr
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SONARR_PROVIDER_LOG";

/// Initialize logging at `info` unless the environment says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Like [`init_logging`], but returns `false` instead of panicking when a
/// subscriber is already installed.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

fn filter(default_level: &str) -> EnvFilter {
    filter_from(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        default_level,
    )
}

fn filter_from(provider: Option<String>, rust_log: Option<String>, default_level: &str) -> EnvFilter {
    [provider, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
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
