//! Decision payloads returned by a brain.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ActionType;

/// Where a decision points the agent.
///
/// A closed variant validated at the brain boundary: anything a decision
/// provider returns that does not fit one of these shapes is rejected as a
/// malformed decision before it reaches the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// No target.
    #[default]
    None,
    /// A grid cell to step towards (must be adjacent to be reachable).
    Coordinate {
        /// Column.
        x: i32,
        /// Row.
        y: i32,
    },
    /// Another entity, by id.
    EntityReference {
        /// Id of the referenced entity.
        id: String,
    },
}

impl Target {
    /// The coordinate pair, if the target carries one.
    pub const fn coordinate(&self) -> Option<(i32, i32)> {
        match self {
            Self::Coordinate { x, y } => Some((*x, *y)),
            Self::None | Self::EntityReference { .. } => None,
        }
    }
}

/// One decision: what to do, where, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Decision {
    /// Chosen action.
    pub action: ActionType,
    /// Optional target.
    #[serde(default)]
    pub target: Target,
    /// Rationale in the agent's own words.
    pub thought: String,
}

impl Decision {
    /// A decision with no target.
    pub fn new(action: ActionType, thought: impl Into<String>) -> Self {
        Self {
            action,
            target: Target::None,
            thought: thought.into(),
        }
    }

    /// Attach a target.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }
}
