//! Perception snapshot handed to the perception formatter.
//!
//! The snapshot is the only view an agent gets of the world when deciding.
//! It is assembled from committed state at the start of the decision pass.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EntityTag;
use crate::structs::{AgentStats, Location};
use crate::time::{GameTime, TimeOfDay};

/// An entity the agent can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VisibleEntity {
    /// Entity id.
    pub id: String,
    /// What it is.
    pub tag: EntityTag,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// Everything an agent perceives in one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PerceptionSnapshot {
    /// Id of the perceiving agent.
    pub agent_id: String,
    /// Current in-world time.
    pub time: GameTime,
    /// Coarse phase of the day.
    pub time_of_day: TimeOfDay,
    /// Human-readable time, e.g. `"Morning, 08:00"`.
    pub time_description: String,
    /// Current weather.
    pub weather: String,
    /// The cell the agent stands on.
    pub location: Location,
    /// Other entities within the perception radius. The agent itself is
    /// not listed.
    pub nearby: Vec<VisibleEntity>,
    /// The agent's own stats.
    pub stats: AgentStats,
}
