//! Error types for the pattern publisher binary.
//!
//! [`PublisherError`] is the top-level error type that wraps all
//! failure modes during publisher startup. Once the pattern tasks are
//! running, nothing they encounter propagates here: tick-local failures
//! are logged and the schedule continues.

/// Top-level error for the pattern publisher binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skywatch_sim::ConfigError,
    },

    /// The broker connection could not be established.
    #[error("broker error: {source}")]
    Broker {
        /// The underlying broker error.
        #[from]
        source: skywatch_broker::BrokerError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
