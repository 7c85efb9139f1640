//! Grid geography for the Digital Soul simulation.
//!
//! This crate models the physical world: a bounded grid of terrain cells
//! and the registry of entities standing on it. Movement legality is
//! enforced here and nowhere else, so neither perception nor decision code
//! can desynchronize an entity's position from the grid.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid and registry operations.
//! - [`layout`] -- Rectangular terrain patches painted from configuration.
//! - [`spatial_map`] -- [`SpatialMap`]: cells, registry, movement, and
//!   nearby-entity queries.

pub mod error;
pub mod layout;
pub mod spatial_map;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use layout::{TerrainPatch, apply_layout, default_walkable};
pub use spatial_map::SpatialMap;
