//! The bounded grid and its entity registry.
//!
//! [`SpatialMap`] owns two things: a row-major vector of terrain cells with
//! fixed dimensions, and a `BTreeMap<String, Entity>` registry. An entity's
//! `x`/`y` are stored once, inside the registry entry, so the registry and
//! the entity can never disagree about where something stands. Every
//! position change goes through [`SpatialMap::move_entity`].
//!
//! Iteration over entities is always in ascending id order. Nearby-entity
//! queries and both tick passes inherit that order, which keeps runs with
//! a fixed population reproducible.

use std::collections::BTreeMap;

use soul_types::{AgentData, Entity, Location, Terrain};
use tracing::debug;

use crate::error::WorldError;

/// A grid of terrain cells plus the entities standing on it.
#[derive(Debug, Clone)]
pub struct SpatialMap {
    /// Number of columns.
    width: i32,
    /// Number of rows.
    height: i32,
    /// Row-major cells, `width * height` long.
    cells: Vec<Location>,
    /// Registered entities keyed by id.
    entities: BTreeMap<String, Entity>,
}

impl SpatialMap {
    /// Create a `width` by `height` grid of walkable empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is not
    /// positive or the cell count overflows.
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        let invalid = || WorldError::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        let columns = usize::try_from(width).map_err(|_err| invalid())?;
        let rows = usize::try_from(height).map_err(|_err| invalid())?;
        let count = columns.checked_mul(rows).ok_or_else(invalid)?;

        let mut cells = Vec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                cells.push(Location::empty(x, y));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            entities: BTreeMap::new(),
        })
    }

    /// Grid width.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether `(x, y)` lies inside `[0, width) x [0, height)`.
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> WorldError {
        WorldError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    // -------------------------------------------------------------------
    // Terrain
    // -------------------------------------------------------------------

    /// Overwrite the cell at `(x, y)`. Any description is cleared.
    ///
    /// Does nothing when `(x, y)` is outside the grid.
    pub fn set_terrain(&mut self, x: i32, y: i32, terrain: Terrain, walkable: bool) {
        let Some(cell) = self.index(x, y).and_then(|i| self.cells.get_mut(i)) else {
            return;
        };
        cell.terrain = terrain;
        cell.walkable = walkable;
        cell.description = None;
    }

    /// Attach flavour text to the cell at `(x, y)`. No-op out of bounds.
    pub fn set_description(&mut self, x: i32, y: i32, description: impl Into<String>) {
        if let Some(cell) = self.index(x, y).and_then(|i| self.cells.get_mut(i)) {
            cell.description = Some(description.into());
        }
    }

    /// The cell at `(x, y)`.
    ///
    /// Coordinates outside the grid yield an impassable wall instead of an
    /// error, so boundary queries need no special casing.
    pub fn get_location(&self, x: i32, y: i32) -> Location {
        self.index(x, y)
            .and_then(|i| self.cells.get(i))
            .cloned()
            .unwrap_or_else(|| Location::boundary(x, y))
    }

    /// Coordinates of every walkable cell in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.walkable)
            .map(|cell| (cell.x, cell.y))
    }

    // -------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------

    /// Insert `entity`, replacing any entity with the same id.
    ///
    /// Returns the replaced entity, if there was one.
    pub fn register_entity(&mut self, entity: Entity) -> Option<Entity> {
        debug!(entity_id = %entity.id, x = entity.x, y = entity.y, "entity registered");
        self.entities.insert(entity.id.clone(), entity)
    }

    /// Whether an entity with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Look up an entity.
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Look up an agent's data.
    pub fn agent(&self, id: &str) -> Option<&AgentData> {
        self.entities.get(id).and_then(Entity::as_agent)
    }

    /// Mutable access to a living agent's data.
    ///
    /// Dead agents are frozen and yield `None`, as do non-agent entities.
    pub fn active_agent_mut(&mut self, id: &str) -> Option<&mut AgentData> {
        self.entities
            .get_mut(id)
            .and_then(Entity::as_agent_mut)
            .filter(|agent| agent.is_active)
    }

    /// All entities in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// All agent entities in id order, dead ones included.
    pub fn agents(&self) -> impl Iterator<Item = (&Entity, &AgentData)> {
        self.entities
            .values()
            .filter_map(|entity| entity.as_agent().map(|agent| (entity, agent)))
    }

    /// Ids of living agents in id order.
    pub fn active_agent_ids(&self) -> Vec<String> {
        self.agents()
            .filter(|(_, agent)| agent.is_active)
            .map(|(entity, _)| entity.id.clone())
            .collect()
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Drop every registered entity. Terrain is kept.
    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    // -------------------------------------------------------------------
    // Movement and queries
    // -------------------------------------------------------------------

    /// Move an entity to `(x, y)`.
    ///
    /// The move is a single step: diagonal neighbours are allowed, jumps of
    /// two or more tiles on either axis are not. Nothing changes on error.
    ///
    /// # Errors
    ///
    /// - [`WorldError::UnknownEntity`] if `id` is not registered.
    /// - [`WorldError::InactiveEntity`] if the entity is a dead agent.
    /// - [`WorldError::OutOfBounds`] if the target is outside the grid.
    /// - [`WorldError::NotWalkable`] if the target cell is blocked.
    /// - [`WorldError::TooFar`] if the Chebyshev distance exceeds 1.
    pub fn move_entity(&mut self, id: &str, x: i32, y: i32) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get(id)
            .ok_or_else(|| WorldError::UnknownEntity(id.to_owned()))?;
        if entity.as_agent().is_some_and(|agent| !agent.is_active) {
            return Err(WorldError::InactiveEntity(id.to_owned()));
        }
        if !self.in_bounds(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        if !self.get_location(x, y).walkable {
            return Err(WorldError::NotWalkable { x, y });
        }
        let distance = entity.x.abs_diff(x).max(entity.y.abs_diff(y));
        if distance > 1 {
            return Err(WorldError::TooFar { x, y, distance });
        }

        if let Some(entity) = self.entities.get_mut(id) {
            entity.x = x;
            entity.y = y;
        }
        Ok(())
    }

    /// Entities within Euclidean distance `radius` of `(x, y)`, in id order.
    ///
    /// An entity standing on `(x, y)` itself is included.
    pub fn nearby_entities(&self, x: i32, y: i32, radius: u32) -> Vec<&Entity> {
        let limit = u64::from(radius).saturating_mul(u64::from(radius));
        self.entities
            .values()
            .filter(|entity| {
                let dx = u64::from(entity.x.abs_diff(x));
                let dy = u64::from(entity.y.abs_diff(y));
                dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) <= limit
            })
            .collect()
    }
}
