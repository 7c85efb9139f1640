//! Enumeration types for the Digital Soul simulation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The closed set of actions an agent can be performing.
///
/// Serialized with the wire names used by decision providers and the HTTP
/// API (`WORK_996`, `REST_PARK`, ...). The per-tick stat consequence of each
/// action lives in the settlement table in `soul-agents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ActionType {
    /// Long-hours work: high income, heavy wear.
    #[serde(rename = "WORK_996")]
    Work996,
    /// Regular office hours: modest income, light wear.
    #[serde(rename = "WORK_965")]
    Work965,
    /// Relax in the park.
    #[serde(rename = "REST_PARK")]
    RestPark,
    /// Spend money on entertainment.
    #[serde(rename = "CONSUME_ENT")]
    ConsumeEnt,
    /// Sleep. Also the action forced on agents at night.
    #[serde(rename = "SLEEP")]
    Sleep,
    /// Do nothing in particular. The fallback when a decision fails.
    #[serde(rename = "IDLE")]
    Idle,
}

impl ActionType {
    /// Every action, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Work996,
        Self::Work965,
        Self::RestPark,
        Self::ConsumeEnt,
        Self::Sleep,
        Self::Idle,
    ];

    /// Wire name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work996 => "WORK_996",
            Self::Work965 => "WORK_965",
            Self::RestPark => "REST_PARK",
            Self::ConsumeEnt => "CONSUME_ENT",
            Self::Sleep => "SLEEP",
            Self::Idle => "IDLE",
        }
    }

    /// Resolve a wire name, ignoring ASCII case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known [`ActionType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for ActionType {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownAction(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Terrain of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Terrain {
    /// Open ground. The default for every cell.
    Empty,
    /// Solid obstacle. Also reported for coordinates outside the grid.
    Wall,
    /// Street.
    Road,
    /// Built structure (office, home, shop).
    Building,
}

impl Terrain {
    /// Display name used in perception text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Wall => "Wall",
            Self::Road => "Road",
            Self::Building => "Building",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entity tags
// ---------------------------------------------------------------------------

/// Payload-free discriminant of an entity kind, used where only the kind
/// matters (perception lists, API summaries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EntityTag {
    /// An agent with stats and a decision loop.
    Agent,
    /// A non-player character placed on the map.
    Npc,
    /// An inert object.
    Object,
}

impl EntityTag {
    /// Display name used in perception text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "Agent",
            Self::Npc => "NPC",
            Self::Object => "Object",
        }
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language used for agent-facing text and API display strings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Simplified Chinese.
    Zh,
}

impl Language {
    /// ISO 639-1 code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

/// Error returned when a string does not name a supported [`Language`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language: {} (expected en or zh)", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Self::En),
            "zh" | "zh-cn" | "chinese" => Ok(Self::Zh),
            _ => Err(UnknownLanguage(s.to_owned())),
        }
    }
}
