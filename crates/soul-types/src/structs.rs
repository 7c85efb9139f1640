//! Core entity structs for the Digital Soul simulation.
//!
//! The map registry stores [`Entity`] values. What an entity *is* lives in
//! its [`EntityKind`]; agents carry their simulation state as an
//! [`AgentData`] payload, resolved by an explicit match rather than by
//! inspecting runtime types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionType, EntityTag, Terrain};
use crate::ids::MemoryId;
use crate::time::GameTime;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Upper bound of the capped vitals (health, sanity, energy).
pub const STAT_MAX: f64 = 100.0;

/// Lower bound of the capped vitals (health, sanity, energy).
pub const STAT_MIN: f64 = 0.0;

/// Physiological and economic stats of an agent.
///
/// Health, sanity and energy live in `[0, 100]`. Wealth is a resource, not
/// a capped vital, and is left unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentStats {
    /// Physical health. Reaching 0 kills the agent.
    pub health: f64,
    /// Mental wellbeing.
    pub sanity: f64,
    /// Stamina available for activity.
    pub energy: f64,
    /// Money on hand. May go negative.
    pub wealth: f64,
}

impl AgentStats {
    /// Clamp the capped vitals back into `[0, 100]`.
    pub fn clamp_vitals(&mut self) {
        self.health = self.health.clamp(STAT_MIN, STAT_MAX);
        self.sanity = self.sanity.clamp(STAT_MIN, STAT_MAX);
        self.energy = self.energy.clamp(STAT_MIN, STAT_MAX);
    }
}

impl Default for AgentStats {
    fn default() -> Self {
        Self {
            health: STAT_MAX,
            sanity: STAT_MAX,
            energy: STAT_MAX,
            wealth: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Life-cycle state of an agent, derived from its flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LifeState {
    /// Active and not sleeping; takes part in the decision pass.
    Awake,
    /// Active and sleeping; skipped by the decision pass until 07:00.
    Asleep,
    /// Inactive. Terminal and absorbing.
    Dead,
}

/// Simulation state carried by an agent entity.
///
/// Once `is_active` is false nothing else in the record changes. Callers
/// that mutate agents go through the guards in `soul-world` and
/// `soul-agents` that enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentData {
    /// Current stats.
    pub stats: AgentStats,
    /// Action the agent is performing; settlement charges its deltas.
    pub current_action: ActionType,
    /// False once the agent has died.
    pub is_active: bool,
    /// True while asleep (forced at night or self-initiated).
    pub is_sleeping: bool,
    /// The agent's guiding values, rewritten by each nightly reflection.
    pub values: String,
    /// Timestamped thoughts since the last reflection.
    pub daily_log: String,
}

impl AgentData {
    /// A fresh, awake agent with default stats holding `values`.
    pub fn new(values: impl Into<String>) -> Self {
        Self {
            stats: AgentStats::default(),
            current_action: ActionType::Idle,
            is_active: true,
            is_sleeping: false,
            values: values.into(),
            daily_log: String::new(),
        }
    }

    /// Derived life-cycle state.
    pub const fn life_state(&self) -> LifeState {
        if !self.is_active {
            LifeState::Dead
        } else if self.is_sleeping {
            LifeState::Asleep
        } else {
            LifeState::Awake
        }
    }

    /// Put the agent to sleep. Returns `false` if it was already asleep
    /// or is dead.
    pub const fn fall_asleep(&mut self) -> bool {
        if !self.is_active || self.is_sleeping {
            return false;
        }
        self.is_sleeping = true;
        self.current_action = ActionType::Sleep;
        true
    }

    /// Wake the agent. Returns `false` if it was not asleep or is dead.
    pub const fn wake_up(&mut self) -> bool {
        if !self.is_active || !self.is_sleeping {
            return false;
        }
        self.is_sleeping = false;
        true
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// What an entity on the map is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    /// A simulated agent.
    Agent(AgentData),
    /// A non-player character.
    Npc,
    /// An inert object.
    Object,
}

impl EntityKind {
    /// Payload-free discriminant.
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Agent(_) => EntityTag::Agent,
            Self::Npc => EntityTag::Npc,
            Self::Object => EntityTag::Object,
        }
    }
}

/// Anything placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Entity {
    /// Unique id within the registry.
    pub id: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Kind and kind-specific data.
    pub kind: EntityKind,
}

impl Entity {
    /// A new agent entity at `(x, y)` holding `values`.
    pub fn agent(id: impl Into<String>, x: i32, y: i32, values: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            kind: EntityKind::Agent(AgentData::new(values)),
        }
    }

    /// Agent payload, if this entity is an agent.
    pub const fn as_agent(&self) -> Option<&AgentData> {
        match &self.kind {
            EntityKind::Agent(data) => Some(data),
            EntityKind::Npc | EntityKind::Object => None,
        }
    }

    /// Mutable agent payload, if this entity is an agent.
    pub const fn as_agent_mut(&mut self) -> Option<&mut AgentData> {
        match &mut self.kind {
            EntityKind::Agent(data) => Some(data),
            EntityKind::Npc | EntityKind::Object => None,
        }
    }

    /// True for agents whose `is_active` flag is set.
    pub fn is_active_agent(&self) -> bool {
        self.as_agent().is_some_and(|agent| agent.is_active)
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Terrain of the cell.
    pub terrain: Terrain,
    /// Whether entities may step onto the cell.
    pub walkable: bool,
    /// Optional flavour text shown in perception.
    pub description: Option<String>,
}

impl Location {
    /// Walkable empty ground at `(x, y)`.
    pub const fn empty(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            terrain: Terrain::Empty,
            walkable: true,
            description: None,
        }
    }

    /// The impassable wall reported for coordinates outside the grid.
    pub const fn boundary(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            terrain: Terrain::Wall,
            walkable: false,
            description: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// A consolidated daily summary held in long-term memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MemorySummary {
    /// Identifier of the summary.
    pub id: MemoryId,
    /// In-world time at consolidation.
    pub game_time: GameTime,
    /// Wall-clock time at consolidation.
    pub recorded_at: DateTime<Utc>,
    /// Summary text: the day's log followed by the reflection.
    pub text: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_full_and_broke() {
        let stats = AgentStats::default();
        assert!((stats.health - 100.0).abs() < f64::EPSILON);
        assert!((stats.energy - 100.0).abs() < f64::EPSILON);
        assert!(stats.wealth.abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_leaves_wealth_alone() {
        let mut stats = AgentStats {
            health: 120.0,
            sanity: -3.0,
            energy: 50.0,
            wealth: -40.0,
        };
        stats.clamp_vitals();
        assert!((stats.health - 100.0).abs() < f64::EPSILON);
        assert!(stats.sanity.abs() < f64::EPSILON);
        assert!((stats.wealth + 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sleep_and_wake_transitions() {
        let mut agent = AgentData::new("values");
        assert_eq!(agent.life_state(), LifeState::Awake);
        assert!(agent.fall_asleep());
        assert!(!agent.fall_asleep());
        assert_eq!(agent.current_action, ActionType::Sleep);
        assert_eq!(agent.life_state(), LifeState::Asleep);
        assert!(agent.wake_up());
        assert!(!agent.wake_up());
    }

    #[test]
    fn dead_agents_do_not_transition() {
        let mut agent = AgentData::new("values");
        agent.is_active = false;
        assert!(!agent.fall_asleep());
        assert!(!agent.is_sleeping);
        assert_eq!(agent.life_state(), LifeState::Dead);
    }

    #[test]
    fn entity_kind_serializes_with_type_tag() {
        let entity = Entity::agent("a", 1, 2, "v");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"]["type"], "agent");
        assert_eq!(json["kind"]["current_action"], "IDLE");

        let npc = Entity {
            id: "n".to_owned(),
            x: 0,
            y: 0,
            kind: EntityKind::Npc,
        };
        assert!(npc.as_agent().is_none());
        assert_eq!(npc.kind.tag(), EntityTag::Npc);
    }
}
