//! Shared type definitions for the Skywatch position simulator.
//!
//! This crate is the single source of truth for the types shared by the
//! pattern publisher and the relay server: the geographic position that
//! travels over the wire, the closed set of motion patterns with their
//! broker topic mapping, and the session identifier used for log
//! correlation.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for relay session identifiers
//! - [`pattern`] -- The closed motion-pattern enum and topic mapping
//! - [`position`] -- The latitude/longitude wire payload

pub mod ids;
pub mod pattern;
pub mod position;

// Re-export all public types at crate root for convenience.
pub use ids::SessionId;
pub use pattern::{MotionPattern, UnknownPatternError};
pub use position::Position;
