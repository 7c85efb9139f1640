//! World engine: the tick orchestrator.
//!
//! Each tick runs through these phases, strictly in order:
//!
//! 1. **Clock** -- advance by the configured step.
//! 2. **Life cycle** -- forced night sleep and the 07:00 wake-up for every
//!    active agent, in id order.
//! 3. **Reflection** -- at exactly 00:00 every active agent reflects on its
//!    day. Brain calls run concurrently; results are applied in id order.
//! 4. **Decision** -- every active, awake agent perceives committed state
//!    and asks its brain for a decision. Calls run concurrently on a bounded
//!    pool with a per-agent deadline; results (including moves) are applied
//!    in id order once all calls have finished or timed out.
//! 5. **Settlement** -- stat deltas for every active agent's current action,
//!    in id order, only after the whole decision phase.
//!
//! No agent observes another agent's post-settlement state within the same
//! tick, and a slow or failing brain degrades one agent to `IDLE` without
//! stalling the others.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use serde::Serialize;
use soul_agents::{MemoryConfig, MemoryStore, RingMemory, SettlementEngine};
use soul_types::{
    ActionType, AgentData, Entity, GameTime, Language, MemorySummary, Terrain, translate,
    translate_with,
};
use soul_world::{SpatialMap, WorldError, apply_layout};
use tracing::{debug, info, warn};

use crate::clock::{Clock, ClockError};
use crate::config::SimulationConfig;
use crate::controller::{
    AgentController, Capabilities, DecisionContext, DecisionPolicy, PendingDecision,
    PendingReflection, Thought, ThoughtRecord,
};
use crate::decision::Brain;
use crate::perception::PerceptionFormatter;

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No agent has this id.
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// An entity with this id already exists.
    #[error("agent already exists: {0}")]
    DuplicateAgent(String),

    /// The agent is dead and cannot be changed.
    #[error("agent is inactive: {0}")]
    InactiveAgent(String),

    /// A map operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The clock could not be built.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

// ---------------------------------------------------------------------------
// Capability wiring
// ---------------------------------------------------------------------------

/// Builds the collaborator bundle for each new agent.
pub trait CapabilityFactory: Send + Sync {
    /// Collaborators for `agent_id`.
    fn capabilities(&self, agent_id: &str) -> Capabilities;
}

/// One shared brain and formatter, plus a fresh [`RingMemory`] per agent.
pub struct SharedCapabilities {
    brain: Arc<dyn Brain>,
    perception: Arc<dyn PerceptionFormatter>,
    memory: MemoryConfig,
}

impl SharedCapabilities {
    /// Wire every agent to `brain` and `perception`.
    pub fn new(
        brain: Arc<dyn Brain>,
        perception: Arc<dyn PerceptionFormatter>,
        memory: MemoryConfig,
    ) -> Self {
        Self {
            brain,
            perception,
            memory,
        }
    }
}

impl CapabilityFactory for SharedCapabilities {
    fn capabilities(&self, _agent_id: &str) -> Capabilities {
        Capabilities {
            memory: Box::new(RingMemory::new(self.memory)),
            brain: Arc::clone(&self.brain),
            perception: Arc::clone(&self.perception),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Time after the clock advanced.
    pub time: GameTime,
    /// Whether that time is night.
    pub is_night: bool,
    /// Action applied by each agent that decided this tick.
    pub decisions: BTreeMap<String, ActionType>,
    /// How many of those decisions were `IDLE` fallbacks.
    pub fallbacks: usize,
    /// Agents that died in settlement.
    pub deaths: Vec<String>,
    /// Agents that collapsed from exhaustion in settlement.
    pub collapsed: Vec<String>,
    /// Agents whose day was archived by reflection.
    pub reflections: usize,
    /// Active agents after settlement.
    pub active_agents: usize,
}

/// Result of [`WorldEngine::inject_event`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventDelivery {
    /// Agents whose memory received the note.
    pub delivered: Vec<String>,
    /// Requested targets that do not exist.
    pub unknown: Vec<String>,
}

/// Archived and current memory of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentHistory {
    /// Archived daily summaries, newest first.
    pub summaries: Vec<MemorySummary>,
    /// The day's log so far.
    pub current_log: String,
    /// The agent's current values.
    pub values: String,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the clock, the map, one controller per agent, and the settlement
/// rules.
pub struct WorldEngine {
    clock: Clock,
    map: SpatialMap,
    layout: Vec<soul_world::TerrainPatch>,
    controllers: BTreeMap<String, AgentController>,
    settlement: SettlementEngine,
    factory: Arc<dyn CapabilityFactory>,
    policy: DecisionPolicy,
    weather: String,
    perception_radius: u32,
    max_concurrent: usize,
    language: Language,
    history_recall: usize,
}

impl std::fmt::Debug for WorldEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldEngine")
            .field("clock", &self.clock)
            .field("agents", &self.controllers.len())
            .field("weather", &self.weather)
            .finish_non_exhaustive()
    }
}

impl WorldEngine {
    /// Build an empty world from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Clock`] for an invalid time step and
    /// [`EngineError::World`] for invalid map dimensions.
    pub fn new(
        config: &SimulationConfig,
        factory: Arc<dyn CapabilityFactory>,
    ) -> Result<Self, EngineError> {
        let clock = Clock::new(&config.time)?;
        let mut map = SpatialMap::new(config.map.width, config.map.height)?;
        apply_layout(&mut map, &config.map.layout);

        info!(
            world = %config.world.name,
            width = config.map.width,
            height = config.map.height,
            start = %clock.now(),
            "world created"
        );

        Ok(Self {
            clock,
            map,
            layout: config.map.layout.clone(),
            controllers: BTreeMap::new(),
            settlement: SettlementEngine::new(config.settlement.into()),
            factory,
            policy: DecisionPolicy {
                timeout: Duration::from_millis(config.world.decision_timeout_ms),
                max_retries: config.llm.max_retries,
            },
            weather: config.world.weather.clone(),
            perception_radius: config.world.perception_radius,
            max_concurrent: config.world.max_concurrent_decisions.max(1),
            language: config.world.language,
            history_recall: config.memory.history_recall,
        })
    }

    // -------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------

    /// Create an agent with default stats at `(x, y)`, wired through the
    /// capability factory.
    ///
    /// # Errors
    ///
    /// - [`EngineError::DuplicateAgent`] if the id is taken.
    /// - [`EngineError::World`] if the cell is off the grid or not walkable.
    pub fn create_agent(&mut self, id: &str, x: i32, y: i32) -> Result<&AgentData, EngineError> {
        let capabilities = self.factory.capabilities(id);
        self.create_agent_with(id, x, y, Some(capabilities))
    }

    /// Create an agent with explicit collaborators. `None` creates an
    /// agent that follows the life cycle and settles but never decides.
    ///
    /// # Errors
    ///
    /// Same as [`create_agent`](Self::create_agent).
    pub fn create_agent_with(
        &mut self,
        id: &str,
        x: i32,
        y: i32,
        capabilities: Option<Capabilities>,
    ) -> Result<&AgentData, EngineError> {
        if self.map.contains(id) {
            return Err(EngineError::DuplicateAgent(id.to_owned()));
        }
        if !self.map.in_bounds(x, y) {
            return Err(WorldError::OutOfBounds {
                x,
                y,
                width: self.map.width(),
                height: self.map.height(),
            }
            .into());
        }
        if !self.map.get_location(x, y).walkable {
            return Err(WorldError::NotWalkable { x, y }.into());
        }

        let values = translate(self.language, "values.default");
        self.map.register_entity(Entity::agent(id, x, y, values));
        self.controllers.insert(
            id.to_owned(),
            AgentController::new(id, capabilities, self.policy, self.language),
        );
        info!(agent_id = id, x, y, "agent created");

        self.map
            .agent(id)
            .ok_or_else(|| EngineError::UnknownAgent(id.to_owned()))
    }

    /// Override an agent's current action. Choosing `SLEEP` also puts it to
    /// sleep.
    ///
    /// Any other action leaves the sleep state alone: a sleeping agent
    /// stays asleep until 07:00 but is settled for the overriding action
    /// until the night transition or its next decision replaces it.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownAgent`] or [`EngineError::InactiveAgent`].
    pub fn set_action(&mut self, id: &str, action: ActionType) -> Result<(), EngineError> {
        if self.map.agent(id).is_none() {
            return Err(EngineError::UnknownAgent(id.to_owned()));
        }
        let agent = self
            .map
            .active_agent_mut(id)
            .ok_or_else(|| EngineError::InactiveAgent(id.to_owned()))?;
        if action == ActionType::Sleep {
            agent.fall_asleep();
        } else {
            agent.current_action = action;
        }
        info!(agent_id = id, action = %action, "action overridden");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Ticks
    // -------------------------------------------------------------------

    /// Run one tick.
    pub async fn tick(&mut self) -> TickSummary {
        let time = self.clock.advance();
        let is_night = self.clock.is_night();
        debug!(tick = self.clock.ticks(), time = %time, is_night, "tick started");

        for controller in self.controllers.values_mut() {
            controller.transition(&mut self.map, &self.clock);
        }

        let reflections = if self.clock.is_midnight() {
            self.reflection_pass().await
        } else {
            0
        };

        let (decisions, fallbacks) = self.decision_pass().await;
        let (deaths, collapsed) = self.settlement_pass();

        let summary = TickSummary {
            time,
            is_night,
            decisions,
            fallbacks,
            deaths,
            collapsed,
            reflections,
            active_agents: self.active_agent_count(),
        };
        info!(
            tick = self.clock.ticks(),
            time = %time,
            decided = summary.decisions.len(),
            fallbacks,
            deaths = summary.deaths.len(),
            active = summary.active_agents,
            "tick complete"
        );
        summary
    }

    /// Run `ticks` ticks. Returns the last summary, or `None` for zero.
    pub async fn run_agent_loop(&mut self, ticks: u32) -> Option<TickSummary> {
        let mut last = None;
        for _ in 0..ticks {
            last = Some(self.tick().await);
        }
        last
    }

    async fn reflection_pass(&mut self) -> usize {
        let pending: Vec<PendingReflection> = self
            .controllers
            .values()
            .filter_map(|controller| controller.prepare_reflection(&self.map))
            .collect();

        let results: BTreeMap<String, _> = stream::iter(pending)
            .map(PendingReflection::think)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut archived = 0_usize;
        for (id, outcome) in results {
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            if controller
                .apply_reflection(&mut self.map, &self.clock, outcome)
                .is_some()
            {
                archived = archived.saturating_add(1);
            }
        }
        info!(time = %self.clock.now(), archived, "daily reflection complete");
        archived
    }

    async fn decision_pass(&mut self) -> (BTreeMap<String, ActionType>, usize) {
        let context = DecisionContext {
            weather: &self.weather,
            radius: self.perception_radius,
        };
        let pending: Vec<PendingDecision> = self
            .controllers
            .values()
            .filter_map(|controller| controller.prepare(&self.map, &self.clock, context))
            .collect();

        let thoughts: Vec<Thought> = stream::iter(pending)
            .map(PendingDecision::think)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let ordered: BTreeMap<String, _> = thoughts
            .into_iter()
            .map(|thought| (thought.agent_id, thought.outcome))
            .collect();

        let mut decisions = BTreeMap::new();
        let mut fallbacks = 0_usize;
        for (id, outcome) in ordered {
            let failed = outcome.is_err();
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            if let Some(action) = controller.apply(&mut self.map, &self.clock, outcome) {
                if failed {
                    fallbacks = fallbacks.saturating_add(1);
                }
                decisions.insert(id, action);
            }
        }
        (decisions, fallbacks)
    }

    fn settlement_pass(&mut self) -> (Vec<String>, Vec<String>) {
        let mut deaths = Vec::new();
        let mut collapsed = Vec::new();

        for id in self.map.active_agent_ids() {
            let Some(action) = self.map.agent(&id).map(|agent| agent.current_action) else {
                continue;
            };
            match self.settlement.apply(&mut self.map, &id, action) {
                Ok(outcome) if outcome.died => deaths.push(id),
                Ok(outcome) if outcome.collapsed => {
                    if let Some(controller) = self.controllers.get_mut(&id) {
                        controller.note(translate(self.language, "memory.collapsed"));
                    }
                    collapsed.push(id);
                }
                Ok(_) => {}
                Err(err) => warn!(agent_id = %id, error = %err, "settlement skipped"),
            }
        }
        (deaths, collapsed)
    }

    // -------------------------------------------------------------------
    // Events and reset
    // -------------------------------------------------------------------

    /// Append an event note to the short-term memory of `targets`, or of
    /// every agent when `targets` is `None`. No stat changes.
    pub fn inject_event(
        &mut self,
        kind: &str,
        description: &str,
        targets: Option<&[String]>,
    ) -> EventDelivery {
        let note = translate_with(
            self.language,
            "memory.event",
            &[("kind", kind), ("description", description)],
        );

        let mut delivery = EventDelivery::default();
        let recipients: Vec<String> =
            targets.map_or_else(|| self.controllers.keys().cloned().collect(), <[String]>::to_vec);
        for id in recipients {
            let Some(controller) = self.controllers.get_mut(&id) else {
                warn!(error = %WorldError::UnknownEntity(id.clone()), "event target skipped");
                delivery.unknown.push(id);
                continue;
            };
            controller.note(&note);
            delivery.delivered.push(id);
        }
        info!(kind, delivered = delivery.delivered.len(), "event injected");
        delivery
    }

    /// Discard every entity and controller and rewind the clock. The
    /// terrain layout is rebuilt.
    pub fn reset(&mut self) {
        self.map.clear_entities();
        self.controllers.clear();
        for y in 0..self.map.height() {
            for x in 0..self.map.width() {
                self.map.set_terrain(x, y, Terrain::Empty, true);
            }
        }
        apply_layout(&mut self.map, &self.layout);
        self.clock.reset();
        info!(time = %self.clock.now(), "world reset");
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The clock.
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The map.
    pub const fn map(&self) -> &SpatialMap {
        &self.map
    }

    /// Mutable access to the map, for seeding stats or terrain between
    /// ticks. Entities registered here get no controller; use
    /// [`create_agent`](Self::create_agent) for agents that should decide.
    pub const fn map_mut(&mut self) -> &mut SpatialMap {
        &mut self.map
    }

    /// Whether it is night.
    pub const fn is_night(&self) -> bool {
        self.clock.is_night()
    }

    /// Current weather.
    pub fn weather(&self) -> &str {
        &self.weather
    }

    /// Language for notes and thoughts.
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Number of living agents.
    pub fn active_agent_count(&self) -> usize {
        self.map.agents().filter(|(_, agent)| agent.is_active).count()
    }

    /// Agent entity by id.
    pub fn agent(&self, id: &str) -> Option<&Entity> {
        self.map.entity(id).filter(|entity| entity.as_agent().is_some())
    }

    /// All agent entities in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Entity> {
        self.map.agents().map(|(entity, _)| entity)
    }

    /// Short-term memory notes, oldest first.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownAgent`] if no agent has this id.
    pub fn recent_memory(&self, id: &str) -> Result<Vec<String>, EngineError> {
        let controller = self.controller(id)?;
        Ok(controller
            .memory()
            .map(MemoryStore::short_term)
            .unwrap_or_default())
    }

    /// The agent's latest thought, if it has decided since creation.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownAgent`] if no agent has this id.
    pub fn latest_thought(&self, id: &str) -> Result<Option<ThoughtRecord>, EngineError> {
        Ok(self.controller(id)?.last_thought().cloned())
    }

    /// Archived summaries plus the current day's log.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownAgent`] if no agent has this id.
    pub fn history(&self, id: &str) -> Result<AgentHistory, EngineError> {
        let controller = self.controller(id)?;
        let agent = self
            .map
            .agent(id)
            .ok_or_else(|| EngineError::UnknownAgent(id.to_owned()))?;
        let summaries = controller
            .memory()
            .map(|memory| memory.recall("", self.history_recall))
            .unwrap_or_default();
        Ok(AgentHistory {
            summaries,
            current_log: agent.daily_log.clone(),
            values: agent.values.clone(),
        })
    }

    fn controller(&self, id: &str) -> Result<&AgentController, EngineError> {
        self.controllers
            .get(id)
            .ok_or_else(|| EngineError::UnknownAgent(id.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use soul_world::TerrainPatch;

    use super::*;
    use crate::decision::RuleBrain;
    use crate::perception::NarrativeFormatter;

    fn engine_with(config: &SimulationConfig) -> WorldEngine {
        let factory = SharedCapabilities::new(
            Arc::new(RuleBrain::default()),
            Arc::new(NarrativeFormatter::default()),
            config.memory.store_config(),
        );
        WorldEngine::new(config, Arc::new(factory)).unwrap()
    }

    fn engine() -> WorldEngine {
        let mut config = SimulationConfig::default();
        config.map.width = 10;
        config.map.height = 10;
        engine_with(&config)
    }

    #[test]
    fn create_agent_uses_defaults() {
        let mut engine = engine();
        let agent = engine.create_agent("a", 1, 1).unwrap();
        assert_eq!(agent.stats, soul_types::AgentStats::default());
        assert_eq!(agent.values, "Survival first, health is most important.");
        assert_eq!(engine.active_agent_count(), 1);
    }

    #[test]
    fn create_agent_rejects_bad_placement() {
        let mut engine = engine();
        engine.create_agent("a", 1, 1).unwrap();
        assert!(matches!(
            engine.create_agent("a", 2, 2),
            Err(EngineError::DuplicateAgent(_))
        ));
        assert!(matches!(
            engine.create_agent("b", 10, 0),
            Err(EngineError::World {
                source: WorldError::OutOfBounds { .. }
            })
        ));
    }

    #[test]
    fn layout_blocks_creation_and_survives_reset() {
        let mut config = SimulationConfig::default();
        config.map.width = 5;
        config.map.height = 5;
        config.map.layout = vec![TerrainPatch {
            x: 0,
            y: 0,
            width: 5,
            height: 1,
            terrain: Terrain::Wall,
            walkable: None,
            description: None,
        }];
        let mut engine = engine_with(&config);
        assert!(matches!(
            engine.create_agent("a", 2, 0),
            Err(EngineError::World {
                source: WorldError::NotWalkable { .. }
            })
        ));
        engine.reset();
        assert!(!engine.map().get_location(2, 0).walkable);
        assert!(engine.map().get_location(2, 1).walkable);
    }

    #[tokio::test]
    async fn tick_decides_then_settles() {
        let mut engine = engine();
        engine.create_agent("a", 1, 1).unwrap();
        let summary = engine.tick().await;

        assert_eq!(summary.time.clock_label(), "07:01");
        assert_eq!(summary.decisions.get("a"), Some(&ActionType::Work996));
        assert_eq!(summary.fallbacks, 0);

        let agent = engine.map().agent("a").unwrap();
        assert!((agent.stats.wealth - 0.5).abs() < 1e-9);
        assert!((agent.stats.energy - 99.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_ticks_do_nothing() {
        let mut engine = engine();
        assert!(engine.run_agent_loop(0).await.is_none());
        assert_eq!(engine.clock().ticks(), 0);
    }

    #[test]
    fn set_action_checks_liveness() {
        let mut engine = engine();
        engine.create_agent("a", 1, 1).unwrap();
        engine.set_action("a", ActionType::ConsumeEnt).unwrap();
        assert_eq!(engine.map().agent("a").unwrap().current_action, ActionType::ConsumeEnt);

        engine.set_action("a", ActionType::Sleep).unwrap();
        assert!(engine.map().agent("a").unwrap().is_sleeping);

        engine.set_action("a", ActionType::Work965).unwrap();
        let agent = engine.map().agent("a").unwrap();
        assert!(agent.is_sleeping);
        assert_eq!(agent.current_action, ActionType::Work965);

        assert!(matches!(
            engine.set_action("ghost", ActionType::Idle),
            Err(EngineError::UnknownAgent(_))
        ));
    }

    #[tokio::test]
    async fn overriding_a_sleeper_keeps_it_asleep_until_seven() {
        let mut config = SimulationConfig::default();
        config.map.width = 10;
        config.map.height = 10;
        config.time.start = GameTime::new(2024, 1, 1, 6, 58);
        let mut engine = engine_with(&config);
        engine.create_agent("a", 1, 1).unwrap();
        engine.set_action("a", ActionType::Sleep).unwrap();

        // 06:59: still asleep, settled for the override.
        engine.set_action("a", ActionType::Work996).unwrap();
        let summary = engine.tick().await;
        assert!(!summary.decisions.contains_key("a"));
        let agent = engine.map().agent("a").unwrap();
        assert!(agent.is_sleeping);
        assert_eq!(agent.current_action, ActionType::Work996);
        assert!((agent.stats.wealth - 0.5).abs() < 1e-9);

        // 07:00: wakes and decides for itself.
        let summary = engine.tick().await;
        assert!(!engine.map().agent("a").unwrap().is_sleeping);
        assert!(summary.decisions.contains_key("a"));
    }

    #[test]
    fn inject_event_reports_unknown_targets() {
        let mut engine = engine();
        engine.create_agent("a", 1, 1).unwrap();
        engine.create_agent("b", 2, 2).unwrap();

        let targets = vec!["a".to_owned(), "zed".to_owned()];
        let delivery = engine.inject_event("Storm", "Rain all day.", Some(&targets));
        assert_eq!(delivery.delivered, vec!["a".to_owned()]);
        assert_eq!(delivery.unknown, vec!["zed".to_owned()]);

        let broadcast = engine.inject_event("Holiday", "Day off.", None);
        assert_eq!(broadcast.delivered, vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(
            engine.recent_memory("b").unwrap(),
            vec!["[EVENT: Holiday] Day off.".to_owned()]
        );
    }

    #[tokio::test]
    async fn reset_discards_agents_and_rewinds() {
        let mut engine = engine();
        engine.create_agent("a", 1, 1).unwrap();
        engine.run_agent_loop(3).await;
        engine.reset();
        assert_eq!(engine.agents().count(), 0);
        assert_eq!(engine.clock().now(), GameTime::default());
        assert!(matches!(engine.history("a"), Err(EngineError::UnknownAgent(_))));
    }
}
