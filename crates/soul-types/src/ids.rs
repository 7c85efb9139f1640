//! UUID identifiers for records the simulation mints.
//!
//! Agents and other map entities are addressed by caller-chosen string ids
//! (see [`Entity`](crate::structs::Entity)). Records the simulation mints
//! itself, such as archived daily summaries, carry UUID v7 identifiers so
//! they sort by creation time.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for an archived long-term memory summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Mint a time-ordered (UUID v7) identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The inner [`Uuid`].
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_time_ordered() {
        let first = MemoryId::new();
        let second = MemoryId::new();
        assert!(first <= second);
        assert_ne!(first, second);
    }

    #[test]
    fn display_matches_inner_uuid() {
        let id = MemoryId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
