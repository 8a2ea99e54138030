//! In-memory broker stub.
//!
//! Fans published payloads out to every live subscription of the topic,
//! entirely in-process. Used by the test suites to exercise the relay's
//! switch protocol and by offline development runs. The stub keeps
//! bookkeeping counters (live subscribers per topic, total unsubscribe
//! calls) that the protocol tests assert against.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::bus::{Broker, Delivery, Subscription};
use crate::error::BrokerError;

/// In-process broker that fans out over unbounded channels.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Mutex<Registry>>,
}

/// Shared registry of live outlets per topic.
#[derive(Debug, Default)]
struct Registry {
    topics: BTreeMap<String, Vec<Outlet>>,
    next_outlet: u64,
    unsubscribe_calls: u64,
}

/// One subscription's sending half, identified for targeted removal.
#[derive(Debug)]
struct Outlet {
    id: u64,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl MemoryBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `topic`.
    ///
    /// Subscriptions that were dropped without an explicit unsubscribe
    /// are not counted once their receiving half is gone.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let registry = self.inner.lock().await;
        registry
            .topics
            .get(topic)
            .map_or(0, |outlets| {
                outlets.iter().filter(|o| !o.tx.is_closed()).count()
            })
    }

    /// Total number of explicit unsubscribe calls seen so far.
    pub async fn unsubscribe_calls(&self) -> u64 {
        self.inner.lock().await.unsubscribe_calls
    }
}

impl Broker for MemoryBroker {
    type Subscription = MemorySubscription;

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut registry = self.inner.lock().await;
        if let Some(outlets) = registry.topics.get_mut(topic) {
            // Sending fails only when the receiving half is gone; prune
            // those outlets as we go.
            outlets.retain(|outlet| {
                outlet
                    .tx
                    .send(Delivery {
                        topic: topic.to_owned(),
                        payload: payload.clone(),
                    })
                    .is_ok()
            });
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<MemorySubscription, BrokerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.inner.lock().await;
        let id = registry.next_outlet;
        registry.next_outlet = registry.next_outlet.wrapping_add(1);
        registry
            .topics
            .entry(topic.to_owned())
            .or_default()
            .push(Outlet { id, tx });
        Ok(MemorySubscription {
            id,
            topic: topic.to_owned(),
            rx,
            registry: Arc::clone(&self.inner),
        })
    }
}

/// A live subscription handed out by [`MemoryBroker`].
#[derive(Debug)]
pub struct MemorySubscription {
    id: u64,
    topic: String,
    rx: mpsc::UnboundedReceiver<Delivery>,
    registry: Arc<Mutex<Registry>>,
}

impl Subscription for MemorySubscription {
    async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    async fn unsubscribe(self) -> Result<(), BrokerError> {
        let mut registry = self.registry.lock().await;
        registry.unsubscribe_calls = registry.unsubscribe_calls.saturating_add(1);
        if let Some(outlets) = registry.topics.get_mut(&self.topic) {
            outlets.retain(|outlet| outlet.id != self.id);
        }
        Ok(())
    }
}
