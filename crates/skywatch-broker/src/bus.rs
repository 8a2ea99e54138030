//! The broker trait seam.
//!
//! The bus is addressed by topic name and treated as a plain byte
//! transport: payloads are published and delivered unmodified. Every
//! delivery is tagged with the topic it arrived on so consumers can
//! filter in-flight messages that raced a topic switch.

use std::future::Future;

use crate::error::BrokerError;

/// One message delivered from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The topic the payload was published on.
    pub topic: String,
    /// The payload bytes, exactly as published.
    pub payload: Vec<u8>,
}

/// A publish/subscribe broker connection.
///
/// Implementations are cheap to clone; all clones share one underlying
/// connection. The connection is owned by whoever constructed it and is
/// passed explicitly into the publisher and the relay.
pub trait Broker: Clone + Send + Sync + 'static {
    /// The subscription handle type this broker hands out.
    type Subscription: Subscription;

    /// Publish `payload` to `topic`. Best-effort: delivery to current
    /// subscribers only, no acknowledgement awaited beyond the send.
    fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Open a new, independent subscription to `topic`.
    ///
    /// The returned handle receives only messages published to `topic`
    /// from this point on; it shares nothing with other handles.
    fn subscribe(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<Self::Subscription, BrokerError>> + Send;
}

/// A live subscription to a single topic.
///
/// Dropping the handle also stops delivery, but [`unsubscribe`] is the
/// deliberate release path: it consumes the handle, so a released
/// subscription cannot be polled again.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub trait Subscription: Send + 'static {
    /// Wait for the next delivery. Returns `None` once the subscription
    /// is closed by the broker side.
    fn next(&mut self) -> impl Future<Output = Option<Delivery>> + Send;

    /// Release the subscription, consuming the handle.
    fn unsubscribe(self) -> impl Future<Output = Result<(), BrokerError>> + Send;
}
