//! NATS-backed broker implementation.
//!
//! Topics map directly onto NATS subjects. The client multiplexes any
//! number of subscriptions over one connection; each
//! [`NatsSubscription`] is its own server-side subscription, so
//! releasing one never affects another.

use futures::StreamExt as _;
use tracing::{debug, info};

use crate::bus::{Broker, Delivery, Subscription};
use crate::error::BrokerError;

/// Broker connection backed by a NATS client.
#[derive(Clone)]
pub struct NatsBroker {
    client: async_nats::Client,
}

impl NatsBroker {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Connect`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        info!(url = url, "connecting to broker");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BrokerError::Connect(format!("failed to connect to {url}: {e}")))?;
        info!("broker connection established");
        Ok(Self { client })
    }

    /// Wrap an existing NATS client.
    pub const fn new(client: async_nats::Client) -> Self {
        Self { client }
    }
}

impl Broker for NatsBroker {
    type Subscription = NatsSubscription;

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        self.client
            .publish(topic.to_owned(), payload.into())
            .await
            .map_err(|e| BrokerError::Publish {
                topic: topic.to_owned(),
                reason: format!("{e}"),
            })
    }

    async fn subscribe(&self, topic: &str) -> Result<NatsSubscription, BrokerError> {
        debug!(topic = topic, "opening subscription");
        let inner = self
            .client
            .subscribe(topic.to_owned())
            .await
            .map_err(|e| BrokerError::Subscribe {
                topic: topic.to_owned(),
                reason: format!("{e}"),
            })?;
        Ok(NatsSubscription { inner })
    }
}

impl std::fmt::Debug for NatsBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBroker")
            .field("connected", &true)
            .finish()
    }
}

/// A single NATS subscription handle.
#[derive(Debug)]
pub struct NatsSubscription {
    inner: async_nats::Subscriber,
}

impl Subscription for NatsSubscription {
    async fn next(&mut self) -> Option<Delivery> {
        self.inner.next().await.map(|msg| Delivery {
            topic: msg.subject.to_string(),
            payload: msg.payload.to_vec(),
        })
    }

    async fn unsubscribe(mut self) -> Result<(), BrokerError> {
        self.inner
            .unsubscribe()
            .await
            .map_err(|e| BrokerError::Unsubscribe(format!("{e}")))
    }
}
