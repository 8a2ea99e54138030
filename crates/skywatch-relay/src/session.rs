//! Per-connection session state and the pattern-switch protocol.
//!
//! A session tracks one viewer's place on the bus: which pattern they
//! follow and the single live subscription handle delivering it. The
//! pattern and the handle live together in one `Option`, so the session
//! structurally cannot hold a topic without a handle, a handle without
//! a topic, or two of either.
//!
//! # Switch protocol
//!
//! 1. Resolve the requested token first. An unknown token is a logged
//!    no-op and the prior subscription stands untouched.
//! 2. Release the old subscription before opening the new one. The
//!    broker must never see two live subscriptions for one session:
//!    that is how two patterns end up interleaved on one viewer's map.
//! 3. Record the new `(pattern, handle)` pair together.
//!
//! Deliveries are additionally filtered against the current pattern's
//! topic, so anything published to the old topic that was still in
//! flight when a switch completed is discarded rather than forwarded.

use std::time::Duration;

use skywatch_broker::{Broker, BrokerError, Delivery, Subscription};
use skywatch_types::{MotionPattern, SessionId};
use tracing::{debug, warn};

/// Pattern a fresh session is subscribed to before the viewer sends
/// any token (the legacy default).
pub const DEFAULT_PATTERN: MotionPattern = MotionPattern::Random;

/// Deadline for any single broker call made by the switch protocol.
/// A hung broker stalls one switch, never the session forever.
const BROKER_CALL_TIMEOUT_MS: u64 = 5_000;

/// The active half of a session: the followed pattern and the one live
/// subscription handle delivering it.
struct ActiveSubscription<S> {
    pattern: MotionPattern,
    subscription: S,
}

/// One viewer connection's session state.
///
/// Owned exclusively by the task handling that viewer's socket; switch
/// requests are processed one at a time because that task is the only
/// caller.
pub struct ConnectionSession<B: Broker> {
    id: SessionId,
    broker: B,
    active: Option<ActiveSubscription<B::Subscription>>,
}

impl<B: Broker> ConnectionSession<B> {
    /// Create a session with no subscription.
    pub fn new(broker: B) -> Self {
        Self {
            id: SessionId::new(),
            broker,
            active: None,
        }
    }

    /// Create a session and establish the default initial subscription.
    ///
    /// New viewers start on [`DEFAULT_PATTERN`] before sending any
    /// token. If the initial subscribe fails (broker unreachable) the
    /// session stays open with no subscription; a later switch request
    /// can still succeed.
    pub async fn open(broker: B) -> Self {
        let mut session = Self::new(broker);
        if let Err(e) = session.switch_to(DEFAULT_PATTERN).await {
            warn!(session = %session.id, error = %e, "initial subscription failed");
        }
        session
    }

    /// This session's identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// The pattern the session currently follows, if any.
    pub fn current_pattern(&self) -> Option<MotionPattern> {
        self.active.as_ref().map(|active| active.pattern)
    }

    /// Process one viewer-issued switch token.
    ///
    /// Resolution happens before any subscription is touched: an
    /// unrecognized token is logged and ignored, leaving the prior
    /// subscription (and its deliveries) fully intact. No error is
    /// echoed to the viewer.
    pub async fn handle_switch_request(&mut self, token: &str) {
        match token.parse::<MotionPattern>() {
            Ok(pattern) => {
                if let Err(e) = self.switch_to(pattern).await {
                    warn!(
                        session = %self.id,
                        pattern = %pattern,
                        error = %e,
                        "pattern switch failed"
                    );
                }
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "ignoring unrecognized pattern token");
            }
        }
    }

    /// Switch the active subscription to `pattern`.
    ///
    /// The old subscription is released before the new one is opened.
    /// If opening the new subscription fails the session is left with
    /// no subscription at all (the old one is already gone by then);
    /// the viewer stops receiving updates until a later switch succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] if the new subscription could not be
    /// established within the deadline.
    pub async fn switch_to(&mut self, pattern: MotionPattern) -> Result<(), BrokerError> {
        self.release_active().await;

        let timeout = Duration::from_millis(BROKER_CALL_TIMEOUT_MS);
        let subscription = tokio::time::timeout(timeout, self.broker.subscribe(pattern.topic()))
            .await
            .map_err(|_elapsed| BrokerError::Timeout {
                timeout_ms: BROKER_CALL_TIMEOUT_MS,
            })??;

        debug!(session = %self.id, pattern = %pattern, "subscription switched");
        self.active = Some(ActiveSubscription {
            pattern,
            subscription,
        });
        Ok(())
    }

    /// Wait for the next delivery for the session's current pattern.
    ///
    /// Pends forever while the session has no subscription (the caller
    /// races this against inbound viewer traffic in a select loop).
    /// Deliveries whose topic does not match the current pattern are
    /// discarded. Returns `None` if the broker closes the subscription,
    /// after which the session is left with no subscription.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        let Some(active) = self.active.as_mut() else {
            return std::future::pending().await;
        };

        loop {
            match active.subscription.next().await {
                Some(delivery) if delivery.topic == active.pattern.topic() => {
                    return Some(delivery);
                }
                Some(delivery) => {
                    // Raced a switch; never forward cross-pattern data.
                    debug!(
                        session = %self.id,
                        topic = delivery.topic,
                        "discarding delivery for a stale topic"
                    );
                }
                None => break,
            }
        }

        debug!(session = %self.id, "broker closed the active subscription");
        self.active = None;
        None
    }

    /// Tear the session down, releasing the active subscription if any.
    ///
    /// Idempotent: the handle is taken out of the session, so however
    /// many times teardown is triggered (read error and close event can
    /// race), exactly one unsubscribe reaches the broker.
    pub async fn teardown(&mut self) {
        self.release_active().await;
    }

    /// Release the active subscription if one is held.
    ///
    /// A failed or timed-out unsubscribe is logged and otherwise
    /// ignored: the handle is dropped either way, which also stops
    /// delivery on every broker implementation used here.
    async fn release_active(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let timeout = Duration::from_millis(BROKER_CALL_TIMEOUT_MS);
        match tokio::time::timeout(timeout, active.subscription.unsubscribe()).await {
            Ok(Ok(())) => {
                debug!(session = %self.id, pattern = %active.pattern, "subscription released");
            }
            Ok(Err(e)) => {
                warn!(session = %self.id, error = %e, "unsubscribe failed, dropping handle");
            }
            Err(_elapsed) => {
                warn!(session = %self.id, "unsubscribe timed out, dropping handle");
            }
        }
    }
}

impl<B: Broker> std::fmt::Debug for ConnectionSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("pattern", &self.current_pattern())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use skywatch_broker::MemoryBroker;
    use tokio::sync::{Mutex, mpsc};

    use super::*;

    const RANDOM_TOPIC: &str = "ufo.position.random";
    const CIRCLE_TOPIC: &str = "ufo.position.circle";
    const EIGHT_TOPIC: &str = "ufo.position.eight";

    /// Receive the session's next delivery or fail after two seconds.
    async fn recv(session: &mut ConnectionSession<MemoryBroker>) -> Delivery {
        tokio::time::timeout(Duration::from_secs(2), session.next_delivery())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn open_subscribes_to_the_default_pattern() {
        let broker = MemoryBroker::new();
        let session = ConnectionSession::open(broker.clone()).await;

        assert_eq!(session.current_pattern(), Some(MotionPattern::Random));
        assert_eq!(broker.subscriber_count(RANDOM_TOPIC).await, 1);
    }

    #[tokio::test]
    async fn switch_releases_the_old_subscription_first() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;

        session.handle_switch_request("Circle").await;

        assert_eq!(session.current_pattern(), Some(MotionPattern::Circle));
        assert_eq!(broker.subscriber_count(RANDOM_TOPIC).await, 0);
        assert_eq!(broker.subscriber_count(CIRCLE_TOPIC).await, 1);
        assert_eq!(broker.unsubscribe_calls().await, 1);
    }

    #[tokio::test]
    async fn at_most_one_subscription_across_any_switch_sequence() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;

        for token in ["Circle", "Eight", "Zigzag", "Random", "Eight", "Circle"] {
            session.handle_switch_request(token).await;
            let mut live = 0_usize;
            for pattern in MotionPattern::ALL {
                live = live.saturating_add(broker.subscriber_count(pattern.topic()).await);
            }
            assert_eq!(live, 1, "exactly one live subscription after {token}");
        }
    }

    #[tokio::test]
    async fn switch_ordering_ends_on_the_last_request() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;

        session.handle_switch_request("Circle").await;
        session.handle_switch_request("Eight").await;

        // An Eight position is in flight (buffered on the session's
        // subscription) when the final switch arrives.
        broker.publish(EIGHT_TOPIC, b"eight-stale".to_vec()).await.unwrap();

        session.handle_switch_request("Random").await;
        assert_eq!(session.current_pattern(), Some(MotionPattern::Random));

        // Only Random data reaches the viewer after the switch.
        broker.publish(EIGHT_TOPIC, b"eight-late".to_vec()).await.unwrap();
        broker.publish(RANDOM_TOPIC, b"random-fresh".to_vec()).await.unwrap();

        let delivery = recv(&mut session).await;
        assert_eq!(delivery.topic, RANDOM_TOPIC);
        assert_eq!(delivery.payload, b"random-fresh");
    }

    #[tokio::test]
    async fn unknown_token_leaves_the_prior_subscription_intact() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;
        session.handle_switch_request("Circle").await;
        let unsubscribes_before = broker.unsubscribe_calls().await;

        session.handle_switch_request("Triangle").await;

        assert_eq!(session.current_pattern(), Some(MotionPattern::Circle));
        assert_eq!(broker.subscriber_count(CIRCLE_TOPIC).await, 1);
        assert_eq!(broker.unsubscribe_calls().await, unsubscribes_before);

        // Deliveries still flow after the rejected token.
        broker.publish(CIRCLE_TOPIC, b"still-here".to_vec()).await.unwrap();
        assert_eq!(recv(&mut session).await.payload, b"still-here");
    }

    #[tokio::test]
    async fn payloads_are_forwarded_verbatim() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;

        let payload = br#"{"latitude":37.272011,"longitude":-115.815498}"#.to_vec();
        broker.publish(RANDOM_TOPIC, payload.clone()).await.unwrap();

        assert_eq!(recv(&mut session).await.payload, payload);
    }

    #[tokio::test]
    async fn teardown_is_idempotent() {
        let broker = MemoryBroker::new();
        let mut session = ConnectionSession::open(broker.clone()).await;

        session.teardown().await;
        session.teardown().await;

        assert_eq!(session.current_pattern(), None);
        assert_eq!(broker.unsubscribe_calls().await, 1);
        assert_eq!(broker.subscriber_count(RANDOM_TOPIC).await, 0);
    }

    /// Broker wrapper whose subscribe calls can be made to fail on
    /// demand, for exercising the failed-switch policy.
    #[derive(Debug, Clone)]
    struct FlakyBroker {
        inner: MemoryBroker,
        fail_subscribe: Arc<AtomicBool>,
    }

    impl Broker for FlakyBroker {
        type Subscription = skywatch_broker::MemorySubscription;

        async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
            self.inner.publish(topic, payload).await
        }

        async fn subscribe(
            &self,
            topic: &str,
        ) -> Result<skywatch_broker::MemorySubscription, BrokerError> {
            if self.fail_subscribe.load(Ordering::SeqCst) {
                return Err(BrokerError::Subscribe {
                    topic: topic.to_owned(),
                    reason: String::from("synthetic failure"),
                });
            }
            self.inner.subscribe(topic).await
        }
    }

    #[tokio::test]
    async fn failed_subscribe_leaves_the_session_unsubscribed() {
        let fail_subscribe = Arc::new(AtomicBool::new(false));
        let broker = FlakyBroker {
            inner: MemoryBroker::new(),
            fail_subscribe: Arc::clone(&fail_subscribe),
        };
        let mut session = ConnectionSession::open(broker.clone()).await;
        assert_eq!(session.current_pattern(), Some(MotionPattern::Random));

        // The old subscription is released before the new subscribe
        // fails, so the session ends up with none at all.
        fail_subscribe.store(true, Ordering::SeqCst);
        session.handle_switch_request("Circle").await;
        assert_eq!(session.current_pattern(), None);
        assert_eq!(broker.inner.subscriber_count(RANDOM_TOPIC).await, 0);

        // A later switch recovers once the broker does.
        fail_subscribe.store(false, Ordering::SeqCst);
        session.handle_switch_request("Circle").await;
        assert_eq!(session.current_pattern(), Some(MotionPattern::Circle));
    }

    #[tokio::test]
    async fn open_survives_an_unreachable_broker() {
        let broker = FlakyBroker {
            inner: MemoryBroker::new(),
            fail_subscribe: Arc::new(AtomicBool::new(true)),
        };
        let session = ConnectionSession::open(broker).await;
        assert_eq!(session.current_pattern(), None);
    }

    /// Broker that feeds one shared scripted stream of deliveries into
    /// every subscription, regardless of topic. Used to prove that the
    /// session filters deliveries by topic rather than trusting the
    /// subscription to be clean.
    #[derive(Debug, Clone)]
    struct ScriptedBroker {
        rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>>,
    }

    #[derive(Debug)]
    struct ScriptedSubscription {
        rx: mpsc::UnboundedReceiver<Delivery>,
    }

    impl Broker for ScriptedBroker {
        type Subscription = ScriptedSubscription;

        async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<(), BrokerError> {
            Ok(())
        }

        async fn subscribe(&self, _topic: &str) -> Result<ScriptedSubscription, BrokerError> {
            let rx = self.rx.lock().await.take();
            rx.map_or_else(
                || {
                    Err(BrokerError::Subscribe {
                        topic: String::from("scripted"),
                        reason: String::from("stream already taken"),
                    })
                },
                |rx| Ok(ScriptedSubscription { rx }),
            )
        }
    }

    impl Subscription for ScriptedSubscription {
        async fn next(&mut self) -> Option<Delivery> {
            self.rx.recv().await
        }

        async fn unsubscribe(self) -> Result<(), BrokerError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn mismatched_topics_are_filtered_out() {
        let (tx, rx) = mpsc::unbounded_channel();
        let broker = ScriptedBroker {
            rx: Arc::new(Mutex::new(Some(rx))),
        };

        // The session believes it follows Random; the scripted stream
        // interleaves other topics around the matching delivery.
        let mut session = ConnectionSession::open(broker).await;
        assert_eq!(session.current_pattern(), Some(MotionPattern::Random));

        for (topic, payload) in [
            (CIRCLE_TOPIC, b"wrong-1".to_vec()),
            (EIGHT_TOPIC, b"wrong-2".to_vec()),
            (RANDOM_TOPIC, b"right".to_vec()),
        ] {
            tx.send(Delivery {
                topic: topic.to_owned(),
                payload,
            })
            .unwrap();
        }

        let delivery = tokio::time::timeout(Duration::from_secs(2), session.next_delivery())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.topic, RANDOM_TOPIC);
        assert_eq!(delivery.payload, b"right");
    }
}
