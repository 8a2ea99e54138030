//! Flight pattern generators and configuration for the Skywatch simulator.
//!
//! The simulator advances one position generator per motion pattern on a
//! fixed tick. The closed-form patterns (circle, eight, zig-zag) are pure
//! functions of the tick counter; the random walk is the only pattern
//! with path-dependent state, and it is seeded so runs are reproducible.
//!
//! # Modules
//!
//! - [`config`] -- Typed YAML configuration shared by both binaries
//! - [`generator`] -- Per-pattern position math and the tick-owning
//!   [`FlightSimulator`](generator::FlightSimulator)

pub mod config;
pub mod generator;

pub use config::{ConfigError, InfrastructureConfig, SkywatchConfig, WorldConfig};
pub use generator::{FlightSimulator, ORIGIN, SimError};
