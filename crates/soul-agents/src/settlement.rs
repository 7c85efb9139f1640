//! Per-tick stat settlement.
//!
//! Every active agent is charged the deltas of its current action once per
//! tick, after all agents have decided. The table below is flat policy;
//! there is no economic model behind it.
//!
//! # Order of operations
//!
//! 1. Skip unknown and dead agents (no mutation)
//! 2. Add the action's deltas to health, sanity, wealth, energy
//! 3. Clamp health, sanity, energy to `[0, 100]`; wealth stays unbounded
//! 4. Health at 0: the agent dies (terminal)
//! 5. Energy at 0 on a living, awake agent: collapse into sleep, if enabled

use soul_types::{ActionType, AgentData, AgentStats};
use soul_world::SpatialMap;
use tracing::{debug, info};

use crate::config::SettlementConfig;
use crate::error::AgentError;

/// Per-tick change of each stat for one action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDelta {
    /// Health change.
    pub health: f64,
    /// Sanity change.
    pub sanity: f64,
    /// Wealth change.
    pub wealth: f64,
    /// Energy change.
    pub energy: f64,
}

/// The settlement table.
pub const fn deltas(action: ActionType) -> StatDelta {
    let (health, sanity, wealth, energy) = match action {
        ActionType::Work996 => (-0.05, -0.05, 0.5, -0.4),
        ActionType::Work965 => (-0.01, -0.01, 0.2, -0.1),
        ActionType::RestPark => (0.02, 0.10, 0.0, 0.1),
        ActionType::ConsumeEnt => (0.0, 0.50, -1.0, -0.05),
        ActionType::Sleep => (0.05, 0.05, 0.0, 0.5),
        ActionType::Idle => (0.0, 0.0, 0.0, -0.01),
    };
    StatDelta {
        health,
        sanity,
        wealth,
        energy,
    }
}

/// What happened to an agent during one settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Health reached 0 and the agent is now inactive.
    pub died: bool,
    /// Energy reached 0 and the agent was forced to sleep.
    pub collapsed: bool,
}

/// Add `delta` to `stats` and clamp the capped vitals.
pub fn apply_delta(stats: &mut AgentStats, delta: StatDelta) {
    stats.health += delta.health;
    stats.sanity += delta.sanity;
    stats.wealth += delta.wealth;
    stats.energy += delta.energy;
    stats.clamp_vitals();
}

/// Applies the settlement table to agents on a map.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: SettlementConfig,
}

impl SettlementEngine {
    /// Create an engine with the given switches.
    pub const fn new(config: SettlementConfig) -> Self {
        Self { config }
    }

    /// Settle one agent's data for `action`.
    ///
    /// Dead agents are left untouched and yield [`AgentError::Inactive`].
    pub fn settle(
        &self,
        agent_id: &str,
        agent: &mut AgentData,
        action: ActionType,
    ) -> Result<SettlementOutcome, AgentError> {
        if !agent.is_active {
            return Err(AgentError::Inactive(agent_id.to_owned()));
        }

        apply_delta(&mut agent.stats, deltas(action));

        let mut outcome = SettlementOutcome::default();
        if agent.stats.health <= 0.0 {
            agent.is_active = false;
            outcome.died = true;
            info!(agent_id, action = %action, "agent died");
            return Ok(outcome);
        }

        if agent.stats.energy <= 0.0 && self.config.exhaustion_forces_sleep && agent.fall_asleep()
        {
            outcome.collapsed = true;
            info!(agent_id, "agent collapsed from exhaustion");
        }

        debug!(
            agent_id,
            action = %action,
            health = agent.stats.health,
            energy = agent.stats.energy,
            wealth = agent.stats.wealth,
            "settled"
        );
        Ok(outcome)
    }

    /// Settle the agent `agent_id` on `map` for `action`.
    ///
    /// # Errors
    ///
    /// - [`AgentError::AgentNotFound`] if no agent has this id. Nothing changes.
    /// - [`AgentError::Inactive`] if the agent is dead. Nothing changes.
    pub fn apply(
        &self,
        map: &mut SpatialMap,
        agent_id: &str,
        action: ActionType,
    ) -> Result<SettlementOutcome, AgentError> {
        if map.agent(agent_id).is_none() {
            return Err(AgentError::AgentNotFound(agent_id.to_owned()));
        }
        let agent = map
            .active_agent_mut(agent_id)
            .ok_or_else(|| AgentError::Inactive(agent_id.to_owned()))?;
        self.settle(agent_id, agent, action)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use soul_types::Entity;

    use super::*;

    fn map_with(stats: AgentStats) -> SpatialMap {
        let mut map = SpatialMap::new(4, 4).unwrap();
        let mut entity = Entity::agent("a", 0, 0, "v");
        if let Some(agent) = entity.as_agent_mut() {
            agent.stats = stats;
        }
        map.register_entity(entity);
        map
    }

    fn stats(map: &SpatialMap) -> AgentStats {
        map.agent("a").unwrap().stats
    }

    #[test]
    fn work_996_moves_every_stat() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats {
            health: 50.0,
            sanity: 50.0,
            energy: 50.0,
            wealth: 10.0,
        });
        engine.apply(&mut map, "a", ActionType::Work996).unwrap();
        let after = stats(&map);
        assert!((after.health - 49.95).abs() < 1e-9);
        assert!((after.sanity - 49.95).abs() < 1e-9);
        assert!((after.energy - 49.6).abs() < 1e-9);
        assert!((after.wealth - 10.5).abs() < 1e-9);
    }

    #[test]
    fn repeated_work_keeps_vitals_in_range() {
        let engine = SettlementEngine::new(SettlementConfig {
            exhaustion_forces_sleep: false,
        });
        let mut map = map_with(AgentStats::default());
        for _ in 0..5_000 {
            let _ = engine.apply(&mut map, "a", ActionType::Work996);
            let s = stats(&map);
            for value in [s.health, s.sanity, s.energy] {
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }

    #[test]
    fn sleep_is_clamped_at_the_top() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats::default());
        engine.apply(&mut map, "a", ActionType::Sleep).unwrap();
        let after = stats(&map);
        assert!((after.health - 100.0).abs() < f64::EPSILON);
        assert!((after.energy - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn consumption_can_push_wealth_negative() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats::default());
        engine.apply(&mut map, "a", ActionType::ConsumeEnt).unwrap();
        assert!((stats(&map).wealth + 1.0).abs() < 1e-9);
    }

    #[test]
    fn death_is_terminal() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats {
            health: 0.03,
            sanity: 50.0,
            energy: 50.0,
            wealth: 0.0,
        });
        let outcome = engine.apply(&mut map, "a", ActionType::Work996).unwrap();
        assert!(outcome.died);
        let frozen = stats(&map);
        assert!(!map.agent("a").unwrap().is_active);

        let again = engine.apply(&mut map, "a", ActionType::Sleep);
        assert_eq!(again, Err(AgentError::Inactive("a".to_owned())));
        assert_eq!(stats(&map), frozen);
    }

    #[test]
    fn exhaustion_forces_sleep_when_enabled() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats {
            health: 80.0,
            sanity: 80.0,
            energy: 0.2,
            wealth: 0.0,
        });
        let outcome = engine.apply(&mut map, "a", ActionType::Work996).unwrap();
        assert!(outcome.collapsed);
        let agent = map.agent("a").unwrap();
        assert!(agent.is_sleeping);
        assert_eq!(agent.current_action, ActionType::Sleep);
    }

    #[test]
    fn exhaustion_is_stat_only_when_disabled() {
        let engine = SettlementEngine::new(SettlementConfig {
            exhaustion_forces_sleep: false,
        });
        let mut map = map_with(AgentStats {
            health: 80.0,
            sanity: 80.0,
            energy: 0.2,
            wealth: 0.0,
        });
        let outcome = engine.apply(&mut map, "a", ActionType::Work996).unwrap();
        assert!(!outcome.collapsed);
        assert!(!map.agent("a").unwrap().is_sleeping);
        assert!(stats(&map).energy.abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_agent_is_reported() {
        let engine = SettlementEngine::default();
        let mut map = map_with(AgentStats::default());
        assert_eq!(
            engine.apply(&mut map, "ghost", ActionType::Idle),
            Err(AgentError::AgentNotFound("ghost".to_owned()))
        );
    }
}
