//! Pattern publisher binary for the Skywatch simulator.
//!
//! This process owns the four motion-pattern simulators. Each runs on
//! its own periodic task, advancing once per tick interval and
//! publishing the new position to its broker topic. Viewer-facing
//! delivery is the relay's job; this binary only feeds the bus.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `skywatch-config.yaml`
//! 3. Connect to the broker
//! 4. Spawn one publishing task per pattern
//! 5. Wait for Ctrl-C, then stop the tasks

mod error;
mod publisher;

use std::path::Path;
use std::time::Duration;

use skywatch_broker::NatsBroker;
use skywatch_sim::{ConfigError, SkywatchConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::PublisherError;
use crate::publisher::PatternPublisher;

/// Application entry point for the pattern publisher.
///
/// # Errors
///
/// Returns an error if configuration loading or the broker connection
/// fails. Failures after startup are logged, never propagated.
#[tokio::main]
async fn main() -> Result<(), PublisherError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("skywatch-publisher starting");

    // 2. Load configuration.
    let config = load_config()?;
    let broker_url = config.infrastructure.broker_url();
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        broker_url = broker_url,
        "Configuration loaded"
    );

    // 3. Connect to the broker.
    let broker = NatsBroker::connect(&broker_url).await?;

    // 4. Spawn the per-pattern publishing tasks.
    let pattern_publisher = PatternPublisher::new(
        broker,
        Duration::from_millis(config.world.tick_interval_ms),
        config.world.seed,
    );
    let handles = pattern_publisher.spawn_all();
    info!(task_count = handles.len(), "Pattern tasks spawned");

    // 5. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping pattern tasks");
    for handle in &handles {
        handle.abort();
    }

    info!("skywatch-publisher shutdown complete");
    Ok(())
}

/// Load the configuration from `skywatch-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// a missing file yields the defaults.
fn load_config() -> Result<SkywatchConfig, ConfigError> {
    let config_path = Path::new("skywatch-config.yaml");
    if config_path.exists() {
        SkywatchConfig::from_file(config_path)
    } else {
        info!("Config file not found, using defaults");
        let mut config = SkywatchConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}
