//! Error types for the `soul-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

/// Errors that can occur during grid and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No entity with this id is registered.
    #[error("entity not found: {0}")]
    UnknownEntity(String),

    /// The entity is a dead agent; its record is frozen.
    #[error("entity {0} is inactive")]
    InactiveEntity(String),

    /// The coordinate lies outside the grid.
    #[error("({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Grid width.
        width: i32,
        /// Grid height.
        height: i32,
    },

    /// The target cell cannot be walked on.
    #[error("({x}, {y}) is not walkable")]
    NotWalkable {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The target is more than one tile away on some axis.
    #[error("({x}, {y}) is {distance} tiles away; only single steps are allowed")]
    TooFar {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Chebyshev distance from the current position.
        distance: u32,
    },

    /// Grid dimensions are not positive or do not fit in memory.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
}
