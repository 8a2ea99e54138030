//! Publish/subscribe broker seam for Skywatch.
//!
//! The publisher and the relay both talk to the message bus through the
//! [`Broker`] trait rather than an ambient client, so the broker
//! connection is an explicitly owned resource passed in at construction.
//! Two implementations are provided:
//!
//! - [`NatsBroker`] -- the production broker. Each `subscribe` call
//!   creates an independent subscription handle on the shared
//!   connection, so every relay session owns exactly one handle and
//!   releasing it cannot disturb any other session.
//! - [`MemoryBroker`] -- an in-process stub used by tests and offline
//!   development to exercise the relay's switch protocol without a
//!   running broker.
//!
//! # Modules
//!
//! - [`bus`] -- The [`Broker`]/[`Subscription`] traits and [`Delivery`]
//! - [`nats`] -- NATS-backed implementation
//! - [`memory`] -- In-memory fan-out stub with bookkeeping counters

pub mod bus;
pub mod error;
pub mod memory;
pub mod nats;

pub use bus::{Broker, Delivery, Subscription};
pub use error::BrokerError;
pub use memory::{MemoryBroker, MemorySubscription};
pub use nats::{NatsBroker, NatsSubscription};
