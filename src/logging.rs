//! Tracing subscriber set-up for the `rackspace-driver` binary.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Raised when a global subscriber is already installed.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

/// Builds the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber, writing formatted events to stderr so
/// command output on stdout stays machine readable.
///
/// # Errors
///
/// Returns [`LoggingError`] when a subscriber has already been installed.
pub fn init() -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|err| LoggingError(err.to_string()))
}
