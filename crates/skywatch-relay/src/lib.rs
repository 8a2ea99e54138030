//! Relay server for the Skywatch position stream.
//!
//! This crate bridges the shared message bus to any number of live
//! viewer `WebSocket` connections. Each connection gets its own
//! [`ConnectionSession`](session::ConnectionSession) holding at most one
//! broker subscription at a time; viewers switch patterns by sending a
//! single text token, and the session releases the old subscription
//! before opening the new one so no viewer ever receives two patterns
//! interleaved.
//!
//! # Architecture
//!
//! Each session is one actor task: a `tokio::select!` loop multiplexes
//! broker deliveries and inbound viewer messages, so switch requests on
//! a session are serialized by construction. Sessions share nothing but
//! the (cheaply cloneable) broker connection. Deliveries are tagged with
//! their topic and filtered against the session's current pattern, which
//! closes the race where a message published to the old topic is still
//! in flight when a switch completes.
//!
//! # HTTP surface
//!
//! `GET /ws` upgrades to the viewer protocol; every other request gets
//! a 404.

pub mod error;
pub mod router;
pub mod server;
pub mod session;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::RelayError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use session::ConnectionSession;
pub use state::AppState;
