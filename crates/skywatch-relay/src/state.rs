//! Shared application state for the relay server.
//!
//! [`AppState`] holds the broker connection every session clones its
//! handle from. It is deliberately thin: sessions own all per-viewer
//! state themselves, and no session's state is visible to another, so
//! nothing here needs a lock.

use skywatch_broker::Broker;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState<B: Broker> {
    /// The broker connection sessions subscribe through.
    pub broker: B,
}

impl<B: Broker> AppState<B> {
    /// Create application state around an established broker connection.
    pub const fn new(broker: B) -> Self {
        Self { broker }
    }
}
