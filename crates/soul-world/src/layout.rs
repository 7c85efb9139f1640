//! Terrain layouts painted onto a fresh map.
//!
//! A layout is a list of rectangular [`TerrainPatch`]es read from
//! configuration. Patches are applied in order, so later patches overwrite
//! earlier ones where they overlap. Cells outside the grid are skipped.

use serde::Deserialize;
use soul_types::Terrain;
use tracing::info;

use crate::spatial_map::SpatialMap;

/// Default walkability for a terrain type when a patch does not say.
pub const fn default_walkable(terrain: Terrain) -> bool {
    !matches!(terrain, Terrain::Wall)
}

/// A rectangle of cells sharing one terrain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TerrainPatch {
    /// Left column.
    pub x: i32,
    /// Top row.
    pub y: i32,
    /// Columns covered (at least 1).
    #[serde(default = "one")]
    pub width: i32,
    /// Rows covered (at least 1).
    #[serde(default = "one")]
    pub height: i32,
    /// Terrain to paint.
    pub terrain: Terrain,
    /// Walkability override. Defaults to [`default_walkable`].
    #[serde(default)]
    pub walkable: Option<bool>,
    /// Flavour text for every painted cell.
    #[serde(default)]
    pub description: Option<String>,
}

const fn one() -> i32 {
    1
}

/// Paint `patches` onto `map` in order. Returns the number of in-bounds
/// cells written.
pub fn apply_layout(map: &mut SpatialMap, patches: &[TerrainPatch]) -> usize {
    let mut painted: usize = 0;
    for patch in patches {
        let walkable = patch
            .walkable
            .unwrap_or_else(|| default_walkable(patch.terrain));
        let right = patch.x.saturating_add(patch.width.max(1));
        let bottom = patch.y.saturating_add(patch.height.max(1));
        for y in patch.y..bottom {
            for x in patch.x..right {
                if !map.in_bounds(x, y) {
                    continue;
                }
                map.set_terrain(x, y, patch.terrain, walkable);
                if let Some(text) = &patch.description {
                    map.set_description(x, y, text.clone());
                }
                painted = painted.saturating_add(1);
            }
        }
    }
    info!(patches = patches.len(), cells = painted, "terrain layout applied");
    painted
}
