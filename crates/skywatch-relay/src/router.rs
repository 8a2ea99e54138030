//! Axum router construction for the relay.
//!
//! The relay exposes exactly one route: the `WebSocket` upgrade at
//! `GET /ws`. Everything else falls through to Axum's default 404
//! response, mirroring the catch-all behavior viewers expect from the
//! legacy relay.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use skywatch_broker::Broker;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the relay server.
///
/// - `GET /ws` -- `WebSocket` position stream
/// - anything else -- 404
pub fn build_router<B: Broker>(state: Arc<AppState<B>>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_endpoint::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
