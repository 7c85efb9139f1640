//! Shared type definitions for the Digital Soul simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types flow downstream to `TypeScript` via `ts-rs` for the
//! browser front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for records the simulation mints
//! - [`time`] -- In-world calendar ([`GameTime`], [`TimeOfDay`])
//! - [`enums`] -- Actions, terrain, entity tags, languages
//! - [`structs`] -- Agents, entities, grid cells, memory summaries
//! - [`decision`] -- Brain output ([`Decision`], [`Target`])
//! - [`perception`] -- Perception snapshot handed to the formatter
//! - [`locale`] -- English and Chinese display strings

pub mod decision;
pub mod enums;
pub mod ids;
pub mod locale;
pub mod perception;
pub mod structs;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use decision::{Decision, Target};
pub use enums::{ActionType, EntityTag, Language, Terrain, UnknownAction, UnknownLanguage};
pub use ids::MemoryId;
pub use locale::{translate, translate_with};
pub use perception::{PerceptionSnapshot, VisibleEntity};
pub use structs::{
    AgentData, AgentStats, Entity, EntityKind, LifeState, Location, MemorySummary, STAT_MAX,
    STAT_MIN,
};
pub use time::{GameTime, TimeOfDay, WAKE_HOUR, WAKE_MINUTE};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes the bindings to `bindings/` relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::ids::MemoryId::export_all();
        let _ = crate::time::GameTime::export_all();
        let _ = crate::time::TimeOfDay::export_all();

        let _ = crate::enums::ActionType::export_all();
        let _ = crate::enums::Terrain::export_all();
        let _ = crate::enums::EntityTag::export_all();
        let _ = crate::enums::Language::export_all();

        let _ = crate::structs::AgentStats::export_all();
        let _ = crate::structs::LifeState::export_all();
        let _ = crate::structs::AgentData::export_all();
        let _ = crate::structs::EntityKind::export_all();
        let _ = crate::structs::Entity::export_all();
        let _ = crate::structs::Location::export_all();
        let _ = crate::structs::MemorySummary::export_all();

        let _ = crate::decision::Target::export_all();
        let _ = crate::decision::Decision::export_all();

        let _ = crate::perception::VisibleEntity::export_all();
        let _ = crate::perception::PerceptionSnapshot::export_all();
    }
}
