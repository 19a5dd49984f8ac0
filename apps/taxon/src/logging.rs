//! # Logging
//!
//! `tracing-subscriber` setup for the binary.
//!
//! - `RUST_LOG` overrides the filter
//! - `TAXON_LOG_FORMAT=json` switches to machine-parseable output
//! - Logs go to stderr; stdout carries command output only

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log format (`text` or `json`).
pub const LOG_FORMAT_ENV_VAR: &str = "TAXON_LOG_FORMAT";

/// Default filter when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "taxon=debug,taxon_core=debug"
    } else {
        "taxon=info,taxon_core=info"
    }
}

/// Install the global subscriber.
pub fn init(verbose: bool) {
    let log_format = std::env::var(LOG_FORMAT_ENV_VAR).unwrap_or_else(|_| "text".to_string());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
