//! Periodic pattern publishing tasks.
//!
//! One independent task per motion pattern: each owns its
//! [`FlightSimulator`], advances it on a fixed interval, and publishes
//! the serialized position to the pattern's broker topic. Publishing is
//! fire-and-forget relative to the ticking clock -- a slow or failing
//! broker call never delays the next tick, and a failure in one
//! pattern's task never affects the other three.

use std::time::Duration;

use skywatch_broker::Broker;
use skywatch_sim::FlightSimulator;
use skywatch_types::{MotionPattern, Position};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Spawns and configures the four per-pattern publishing tasks.
#[derive(Debug)]
pub struct PatternPublisher<B: Broker> {
    broker: B,
    tick_interval: Duration,
    seed: u64,
}

impl<B: Broker> PatternPublisher<B> {
    /// Create a publisher that ticks every `tick_interval` using the
    /// given broker connection. `seed` fixes the random-walk pattern's
    /// trajectory.
    pub const fn new(broker: B, tick_interval: Duration, seed: u64) -> Self {
        Self {
            broker,
            tick_interval,
            seed,
        }
    }

    /// Spawn one publishing task per motion pattern and return their
    /// handles. The tasks run until aborted or until the process exits.
    pub fn spawn_all(&self) -> Vec<JoinHandle<()>> {
        MotionPattern::ALL
            .into_iter()
            .zip(0_u64..)
            .map(|(pattern, index)| {
                // Offset the seed per pattern so simulators never share
                // a random stream.
                let seed = self.seed.wrapping_add(index);
                let simulator = FlightSimulator::new(pattern, seed);
                tokio::spawn(run_pattern_task(
                    self.broker.clone(),
                    simulator,
                    self.tick_interval,
                ))
            })
            .collect()
    }
}

/// Drive one pattern's simulator forever: advance on each tick and hand
/// the position off for publishing.
///
/// The only way out of the loop is tick-counter overflow, which is
/// unreachable in any real deployment but handled rather than wrapped.
pub async fn run_pattern_task<B: Broker>(
    broker: B,
    mut simulator: FlightSimulator,
    tick_interval: Duration,
) {
    let pattern = simulator.pattern();
    let mut ticker = tokio::time::interval(tick_interval);
    loop {
        ticker.tick().await;
        match simulator.advance() {
            Ok(position) => {
                debug!(
                    pattern = %pattern,
                    tick = simulator.tick(),
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "tick advanced"
                );
                publish_position(&broker, pattern, simulator.tick(), position);
            }
            Err(e) => {
                error!(pattern = %pattern, error = %e, "simulator cannot advance, stopping task");
                return;
            }
        }
    }
}

/// Serialize and publish one position, fire-and-forget.
///
/// The publish itself runs on a detached task so the caller's tick
/// schedule is never blocked by the broker. Serialization and publish
/// failures are logged and dropped; the next tick publishes fresh data
/// anyway.
fn publish_position<B: Broker>(broker: &B, pattern: MotionPattern, tick: u64, position: Position) {
    let topic = pattern.topic();
    match serde_json::to_vec(&position) {
        Ok(payload) => {
            let broker = broker.clone();
            tokio::spawn(async move {
                if let Err(e) = broker.publish(topic, payload).await {
                    warn!(topic = topic, tick = tick, error = %e, "failed to publish position");
                }
            });
        }
        Err(e) => {
            warn!(topic = topic, tick = tick, error = %e, "failed to serialize position");
        }
    }
}
