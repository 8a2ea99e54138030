//! Relay server binary for the Skywatch position stream.
//!
//! Accepts viewer `WebSocket` connections and relays each viewer's
//! chosen pattern stream from the broker, one session per connection.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `skywatch-config.yaml`
//! 3. Connect to the broker
//! 4. Serve viewer connections until terminated

use std::path::Path;
use std::sync::Arc;

use skywatch_broker::NatsBroker;
use skywatch_relay::error::RelayError;
use skywatch_relay::server::ServerConfig;
use skywatch_relay::state::AppState;
use skywatch_sim::{ConfigError, SkywatchConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the relay server.
///
/// # Errors
///
/// Returns an error if configuration loading, the broker connection,
/// or the listener bind fails. Per-session failures after startup are
/// handled inside the sessions.
#[tokio::main]
async fn main() -> Result<(), RelayError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("skywatch-relay starting");

    // 2. Load configuration.
    let config = load_config()?;
    let broker_url = config.infrastructure.broker_url();
    info!(
        broker_url = broker_url,
        relay_host = config.infrastructure.relay_host,
        relay_port = config.infrastructure.relay_port,
        "Configuration loaded"
    );

    // 3. Connect to the broker.
    let broker = NatsBroker::connect(&broker_url).await?;
    let state = Arc::new(AppState::new(broker));

    // 4. Serve until terminated.
    let server_config = ServerConfig {
        host: config.infrastructure.relay_host.clone(),
        port: config.infrastructure.relay_port,
    };
    skywatch_relay::server::start_server(&server_config, state).await?;

    info!("skywatch-relay shutdown complete");
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
