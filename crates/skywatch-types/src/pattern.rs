//! The closed set of motion patterns and their broker topic mapping.
//!
//! Each pattern maps 1:1 to a broker topic. The mapping is a static,
//! total function over the enum; unknown pattern names are rejected at
//! parse time, never defaulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A motion pattern the simulated craft can fly.
///
/// Viewers select a pattern by sending its wire token (the exact strings
/// accepted by [`FromStr`]) over the relay connection. The set is closed:
/// adding a pattern means adding a variant, a token, and a topic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MotionPattern {
    /// Unbounded random walk from the origin.
    Random,
    /// Closed circle around the origin.
    Circle,
    /// Figure-eight (lemniscate-like) curve around the origin.
    Eight,
    /// Eastward drift with a sinusoidal north/south oscillation.
    ZigZag,
}

impl MotionPattern {
    /// All patterns, in the order the publisher spawns them.
    pub const ALL: [Self; 4] = [Self::Random, Self::Circle, Self::Eight, Self::ZigZag];

    /// The broker topic positions for this pattern are published on.
    pub const fn topic(self) -> &'static str {
        match self {
            Self::Random => "ufo.position.random",
            Self::Circle => "ufo.position.circle",
            Self::Eight => "ufo.position.eight",
            Self::ZigZag => "ufo.position.zigzag",
        }
    }

    /// The wire token viewers send to select this pattern.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Circle => "Circle",
            Self::Eight => "Eight",
            Self::ZigZag => "Zigzag",
        }
    }
}

impl fmt::Display for MotionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A pattern-switch request named a pattern outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown motion pattern: {0:?}")]
pub struct UnknownPatternError(pub String);

impl FromStr for MotionPattern {
    type Err = UnknownPatternError;

    /// Parse a wire token. Matching is exact (case-sensitive): the
    /// protocol tokens are `Random`, `Circle`, `Eight`, and `Zigzag`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Random" => Ok(Self::Random),
            "Circle" => Ok(Self::Circle),
            "Eight" => Ok(Self::Eight),
            "Zigzag" => Ok(Self::ZigZag),
            other => Err(UnknownPatternError(other.to_owned())),
        }
    }
}
