//! The latitude/longitude payload that travels over the wire.

use serde::{Deserialize, Serialize};

/// A geographic position in decimal degrees.
///
/// This is the complete wire payload: the publisher serializes it as a
/// flat JSON object with exactly the `latitude` and `longitude` fields,
/// and the relay forwards those bytes to viewers verbatim. The domain
/// imposes no bounds checking, but values are expected to stay finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees (north positive).
    pub latitude: f64,
    /// Longitude in decimal degrees (east positive).
    pub longitude: f64,
}

impl Position {
    /// Create a position from decimal-degree coordinates.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates are finite (not NaN or infinite).
    pub fn is_finite(self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}
