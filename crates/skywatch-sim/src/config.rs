//! Configuration loading and typed config structures for Skywatch.
//!
//! The canonical configuration lives in `skywatch-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads the file. Both
//! binaries (publisher and relay) share this configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level Skywatch configuration.
///
/// Mirrors the structure of `skywatch-config.yaml`. All fields have
/// defaults, so a missing file or an empty document yields a usable
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SkywatchConfig {
    /// Simulation settings (seed, tick cadence).
    #[serde(default)]
    pub world: WorldConfig,

    /// Broker and relay network settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,
}

impl SkywatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `BROKER_HOST` environment variable overrides
    /// `infrastructure.broker_host` so deployments can point at a broker
    /// without editing the YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed fixing the random-walk trajectory.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Broker and relay network settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Hostname or address of the message broker.
    #[serde(default = "default_broker_host")]
    pub broker_host: String,

    /// Broker port. Not overridable from the environment; the broker
    /// listens on its well-known port in every deployment.
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,

    /// Address the relay binds its listener to.
    #[serde(default = "default_relay_host")]
    pub relay_host: String,

    /// Port the relay accepts viewer connections on.
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,
}

impl InfrastructureConfig {
    /// Override the broker host with the `BROKER_HOST` environment
    /// variable when set.
    ///
    /// This allows Docker Compose (or any deployment) to point the
    /// processes at a broker without modifying the YAML config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("BROKER_HOST") {
            self.broker_host = val;
        }
    }

    /// The broker URL in the scheme the NATS client dials.
    pub fn broker_url(&self) -> String {
        format!("nats://{}:{}", self.broker_host, self.broker_port)
    }
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
            relay_host: default_relay_host(),
            relay_port: default_relay_port(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_broker_host() -> String {
    String::from("localhost")
}

const fn default_broker_port() -> u16 {
    4222
}

fn default_relay_host() -> String {
    String::from("0.0.0.0")
}

const fn default_relay_port() -> u16 {
    8080
}
