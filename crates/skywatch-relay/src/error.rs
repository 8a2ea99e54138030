//! Error types for the relay binary.
//!
//! [`RelayError`] wraps the failure modes of relay startup. Once the
//! server is accepting connections nothing propagates here: failures
//! local to one session never affect other sessions or the process.

use crate::server::ServerError;

/// Top-level error for the relay binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
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

    /// The HTTP server failed to start or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}
