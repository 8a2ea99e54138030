//! `WebSocket` handler bridging one viewer to their session.
//!
//! Clients connect to `GET /ws` and immediately receive the default
//! pattern's position stream as JSON text frames. Sending one of the
//! pattern tokens (`Random`, `Circle`, `Eight`, `Zigzag`) switches the
//! stream; anything else is logged and ignored.
//!
//! The socket and the broker subscription are multiplexed in a single
//! `tokio::select!` loop, so each session processes its inbound
//! requests strictly in arrival order.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use skywatch_broker::Broker;
use tracing::{debug, info, warn};

use crate::session::ConnectionSession;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// relaying position updates.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_endpoint<B: Broker>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<B>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: open a session, relay deliveries
/// outbound and switch tokens inbound until the viewer goes away, then
/// tear the session down.
async fn handle_ws<B: Broker>(mut socket: WebSocket, state: Arc<AppState<B>>) {
    let mut session = ConnectionSession::open(state.broker.clone()).await;
    info!(session = %session.id(), "viewer connected");

    loop {
        tokio::select! {
            // A position update from the session's current pattern.
            maybe = session.next_delivery() => {
                match maybe {
                    Some(delivery) => {
                        // Payloads are forwarded verbatim; they are only
                        // re-checked as UTF-8 because the socket frame is
                        // textual.
                        let text = match String::from_utf8(delivery.payload) {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(
                                    session = %session.id(),
                                    error = %e,
                                    "dropping non-UTF-8 position payload"
                                );
                                continue;
                            }
                        };
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            debug!(session = %session.id(), "viewer disconnected (send failed)");
                            break;
                        }
                    }
                    None => {
                        // The broker closed the subscription; the viewer
                        // just stops receiving until they switch again.
                        debug!(session = %session.id(), "position stream ended");
                    }
                }
            }
            // An inbound frame from the viewer.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(token))) => {
                        session.handle_switch_request(token.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(session = %session.id(), "viewer disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(session = %session.id(), "viewer disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(session = %session.id(), error = %e, "websocket error");
                        break;
                    }
                    _ => {
                        // Ignore binary and pong frames.
                    }
                }
            }
        }
    }

    session.teardown().await;
    info!(session = %session.id(), "viewer session closed");
}
