//! Seed-agent spawner.
//!
//! Places `population.initial_agents` agents named `agent-1`, `agent-2`,
//! ... on distinct walkable cells. Cell choice comes from an RNG seeded
//! with `population.seed`, so the same configuration always produces the
//! same starting positions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use soul_core::WorldEngine;
use soul_core::config::PopulationConfig;
use tracing::info;

use crate::error::AppError;

/// Create the seed agents and return their ids in creation order.
///
/// # Errors
///
/// Returns [`AppError::Spawner`] if the map has fewer walkable cells than
/// requested agents, and [`AppError::Engine`] if an agent cannot be
/// created.
pub fn spawn_seed_agents(
    engine: &mut WorldEngine,
    population: &PopulationConfig,
) -> Result<Vec<String>, AppError> {
    let wanted = usize::try_from(population.initial_agents).map_err(|e| AppError::Spawner {
        message: format!("initial_agents out of range: {e}"),
    })?;
    if wanted == 0 {
        return Ok(Vec::new());
    }

    let cells: Vec<(i32, i32)> = engine.map().walkable_cells().collect();
    if cells.len() < wanted {
        return Err(AppError::Spawner {
            message: format!(
                "{wanted} agents requested but only {} walkable cells exist",
                cells.len()
            ),
        });
    }

    let mut rng = StdRng::seed_from_u64(population.seed);
    let picks: Vec<(i32, i32)> = cells.choose_multiple(&mut rng, wanted).copied().collect();

    let mut ids = Vec::with_capacity(wanted);
    for (n, (x, y)) in (1_u32..).zip(picks) {
        let id = format!("agent-{n}");
        engine.create_agent(&id, x, y)?;
        ids.push(id);
    }

    info!(
        count = ids.len(),
        seed = population.seed,
        "seed agents spawned"
    );
    Ok(ids)
}
