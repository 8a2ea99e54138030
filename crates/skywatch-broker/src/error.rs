//! Error types for broker operations.

/// Errors that can occur when talking to the message broker.
///
/// Broker failures are never fatal to the process: publishers log them
/// and keep their tick schedule, and relay sessions are left without an
/// active subscription rather than torn down.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Establishing the broker connection failed.
    #[error("broker connect failed: {0}")]
    Connect(String),

    /// A publish call failed.
    #[error("publish to {topic} failed: {reason}")]
    Publish {
        /// The topic the payload was addressed to.
        topic: String,
        /// Description of the failure.
        reason: String,
    },

    /// A subscribe call failed.
    #[error("subscribe to {topic} failed: {reason}")]
    Subscribe {
        /// The topic that could not be subscribed.
        topic: String,
        /// Description of the failure.
        reason: String,
    },

    /// Releasing a subscription failed.
    #[error("unsubscribe failed: {0}")]
    Unsubscribe(String),

    /// A broker call exceeded its deadline.
    #[error("broker call timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
}
