//! Tracing subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Install the global tracing subscriber. Call once, at process start.
///
/// `RUST_LOG` wins over the configured level; outside production the output
/// additionally carries source locations.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));

    let with_source = !settings.environment.is_production();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(with_source)
        .with_line_number(with_source)
        .init();
}
