//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Relay sessions are identified by a UUID v7 (time-ordered) so log
//! lines from one viewer connection can be correlated across the
//! session's lifetime.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one viewer connection's relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<SessionId> for Uuid {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn display_round_trips_through_uuid() {
        let id = SessionId::new();
        let parsed: Uuid = id.to_string().parse().unwrap();
        assert_eq!(SessionId::from(parsed), id);
    }
}
