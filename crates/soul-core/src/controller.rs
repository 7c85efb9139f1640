//! Per-agent decision, action, and record cycle.
//!
//! An [`AgentController`] binds one agent id to its collaborators (memory
//! store, brain, perception formatter) and runs the awake/asleep life
//! cycle plus the decision cycle for that agent. The agent's data itself
//! stays a plain record on the [`SpatialMap`]; the controller never caches
//! it.
//!
//! A decision is split into three steps so the engine can run many of
//! them concurrently without sharing the map across tasks:
//!
//! 1. [`AgentController::prepare`] reads committed state and returns an
//!    owned [`PendingDecision`] (rendered perception, memory context,
//!    stats snapshot, brain handle).
//! 2. [`PendingDecision::think`] calls the brain under a timeout with
//!    bounded retries. It touches no shared state.
//! 3. [`AgentController::apply`] writes the result back: action, move,
//!    self-initiated sleep, memory notes, daily log. A failed or timed-out
//!    call becomes `IDLE` plus a diagnostic note.
//!
//! [`AgentController::decide_and_act`] chains the three for one agent.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use soul_agents::{MemoryStore, Transition, lifecycle};
use soul_types::{
    ActionType, AgentStats, Decision, GameTime, Language, MemoryId, translate, translate_with,
};
use soul_world::SpatialMap;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::decision::{Brain, DecisionError};
use crate::perception::{PerceptionFormatter, assemble_snapshot};

/// The collaborators one agent needs to decide.
pub struct Capabilities {
    /// The agent's own memory store.
    pub memory: Box<dyn MemoryStore>,
    /// Decision policy, usually shared between agents.
    pub brain: Arc<dyn Brain>,
    /// Perception renderer, usually shared between agents.
    pub perception: Arc<dyn PerceptionFormatter>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

/// Time and retry budget for one brain call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPolicy {
    /// Budget for the whole call, retries included.
    pub timeout: Duration,
    /// Extra attempts after a failed call.
    pub max_retries: u32,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 0,
        }
    }
}

/// World context shared by every decision in a pass.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// Current weather.
    pub weather: &'a str,
    /// Perception radius in tiles.
    pub radius: u32,
}

/// The most recent thought an agent had.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ThoughtRecord {
    /// When it was recorded.
    pub time: GameTime,
    /// The thought.
    pub text: String,
}

/// Drives one agent.
#[derive(Debug)]
pub struct AgentController {
    agent_id: String,
    capabilities: Option<Capabilities>,
    policy: DecisionPolicy,
    language: Language,
    last_thought: Option<ThoughtRecord>,
}

impl AgentController {
    /// Create a controller for `agent_id`. Without capabilities the
    /// controller still runs life-cycle transitions but never decides.
    pub fn new(
        agent_id: impl Into<String>,
        capabilities: Option<Capabilities>,
        policy: DecisionPolicy,
        language: Language,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            capabilities,
            policy,
            language,
            last_thought: None,
        }
    }

    /// The controlled agent's id.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Whether all collaborators are bound.
    pub const fn is_bound(&self) -> bool {
        self.capabilities.is_some()
    }

    /// Bind (or replace) the collaborators.
    pub fn bind(&mut self, capabilities: Capabilities) {
        self.capabilities = Some(capabilities);
    }

    /// The agent's memory store, if bound.
    pub fn memory(&self) -> Option<&dyn MemoryStore> {
        self.capabilities.as_ref().map(|caps| caps.memory.as_ref())
    }

    /// The latest recorded thought.
    pub const fn last_thought(&self) -> Option<&ThoughtRecord> {
        self.last_thought.as_ref()
    }

    /// Append a note to short-term memory. Dropped when unbound.
    pub fn note(&mut self, text: &str) {
        if let Some(caps) = self.capabilities.as_mut() {
            caps.memory.add_short_term(text);
        }
    }

    // -------------------------------------------------------------------
    // Life cycle
    // -------------------------------------------------------------------

    /// Evaluate the night and morning transitions and record them in
    /// memory.
    pub fn transition(&mut self, map: &mut SpatialMap, clock: &Clock) -> Transition {
        let Some(agent) = map.active_agent_mut(&self.agent_id) else {
            return Transition::Unchanged;
        };
        let transition = lifecycle::evaluate(agent, &clock.now());
        match transition {
            Transition::ForcedSleep => {
                debug!(agent_id = %self.agent_id, time = %clock.now(), "forced night sleep");
                self.note(translate(self.language, "memory.forced_sleep"));
            }
            Transition::WokeUp => {
                debug!(agent_id = %self.agent_id, time = %clock.now(), "woke up");
                self.note(translate(self.language, "memory.woke_up"));
            }
            Transition::Unchanged => {}
        }
        transition
    }

    // -------------------------------------------------------------------
    // Decision cycle
    // -------------------------------------------------------------------

    /// Collect everything the brain needs from committed state.
    ///
    /// Returns `None` (a silent no-op, not an error) when the agent is
    /// unknown, dead, asleep, or the controller is unbound.
    pub fn prepare(
        &self,
        map: &SpatialMap,
        clock: &Clock,
        context: DecisionContext<'_>,
    ) -> Option<PendingDecision> {
        let caps = self.capabilities.as_ref()?;
        let agent = map.agent(&self.agent_id)?;
        if !agent.is_active || agent.is_sleeping {
            return None;
        }
        let snapshot = assemble_snapshot(map, clock, &self.agent_id, context.weather, context.radius)?;

        Some(PendingDecision {
            agent_id: self.agent_id.clone(),
            perception: caps.perception.format(&snapshot),
            memory: caps.memory.recent_context(),
            stats: agent.stats,
            brain: Arc::clone(&caps.brain),
            policy: self.policy,
        })
    }

    /// Write a brain result back to the world.
    ///
    /// Returns the action now in effect, or `None` if the agent can no
    /// longer act (dead, asleep, gone, or unbound).
    pub fn apply(
        &mut self,
        map: &mut SpatialMap,
        clock: &Clock,
        outcome: Result<Decision, DecisionError>,
    ) -> Option<ActionType> {
        if !self.is_bound() {
            return None;
        }
        let agent = map.active_agent_mut(&self.agent_id)?;
        if agent.is_sleeping {
            return None;
        }

        let decision = match outcome {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    agent_id = %self.agent_id,
                    error = %err,
                    "decision failed, falling back to IDLE"
                );
                agent.current_action = ActionType::Idle;
                let note = translate_with(
                    self.language,
                    "memory.decision_failed",
                    &[("reason", &err.to_string())],
                );
                self.note(&note);
                self.note_action(ActionType::Idle);
                return Some(ActionType::Idle);
            }
        };

        let now = clock.now();
        agent.current_action = decision.action;
        if decision.action == ActionType::Sleep {
            agent.is_sleeping = true;
        }
        let _ = writeln!(agent.daily_log, "[{}] {}", now.clock_label(), decision.thought);

        if let Some((x, y)) = decision.target.coordinate()
            && let Err(err) = map.move_entity(&self.agent_id, x, y)
        {
            debug!(agent_id = %self.agent_id, x, y, error = %err, "move rejected");
            let note = translate_with(
                self.language,
                "memory.failed_move",
                &[("x", &x.to_string()), ("y", &y.to_string())],
            );
            self.note(&note);
        }

        let thought = translate_with(
            self.language,
            "memory.thought",
            &[("thought", &decision.thought)],
        );
        self.note(&thought);
        self.note_action(decision.action);
        self.last_thought = Some(ThoughtRecord {
            time: now,
            text: decision.thought,
        });

        debug!(agent_id = %self.agent_id, action = %decision.action, "decision applied");
        Some(decision.action)
    }

    fn note_action(&mut self, action: ActionType) {
        let note = translate_with(self.language, "memory.action", &[("action", action.as_str())]);
        self.note(&note);
    }

    /// Perceive, decide, and act for this agent alone.
    pub async fn decide_and_act(
        &mut self,
        map: &mut SpatialMap,
        clock: &Clock,
        context: DecisionContext<'_>,
    ) -> Option<ActionType> {
        let pending = self.prepare(map, clock, context)?;
        let thought = pending.think().await;
        self.apply(map, clock, thought.outcome)
    }

    // -------------------------------------------------------------------
    // Reflection
    // -------------------------------------------------------------------

    /// Collect the day's log for reflection. `None` when the agent is
    /// unknown, dead, or the controller is unbound.
    pub fn prepare_reflection(&self, map: &SpatialMap) -> Option<PendingReflection> {
        let caps = self.capabilities.as_ref()?;
        let agent = map.agent(&self.agent_id)?;
        if !agent.is_active {
            return None;
        }
        Some(PendingReflection {
            agent_id: self.agent_id.clone(),
            daily_log: agent.daily_log.clone(),
            brain: Arc::clone(&caps.brain),
            policy: self.policy,
        })
    }

    /// Store a reflection: overwrite values on success, archive the day
    /// into long-term memory, clear the daily log.
    ///
    /// Returns the archived summary's id, or `None` if nothing was done.
    pub fn apply_reflection(
        &mut self,
        map: &mut SpatialMap,
        clock: &Clock,
        outcome: Result<String, DecisionError>,
    ) -> Option<MemoryId> {
        let agent = map.active_agent_mut(&self.agent_id)?;
        let caps = self.capabilities.as_mut()?;

        let log = std::mem::take(&mut agent.daily_log);
        let summary = match outcome {
            Ok(reflection) => {
                let line = translate_with(self.language, "memory.reflection", &[("text", &reflection)]);
                agent.values = reflection;
                info!(agent_id = %self.agent_id, values = %agent.values, "agent reflected");
                format!("{log}{line}")
            }
            Err(err) => {
                warn!(
                    agent_id = %self.agent_id,
                    error = %err,
                    "reflection failed, values unchanged"
                );
                log
            }
        };

        Some(caps.memory.consolidate_daily(&summary, clock.now()))
    }
}

// ---------------------------------------------------------------------------
// Pending work
// ---------------------------------------------------------------------------

/// Brain input captured from committed state. Owned, so it can run on any
/// task while the engine keeps the map.
pub struct PendingDecision {
    agent_id: String,
    perception: String,
    memory: String,
    stats: AgentStats,
    brain: Arc<dyn Brain>,
    policy: DecisionPolicy,
}

/// The result of [`PendingDecision::think`].
#[derive(Debug)]
pub struct Thought {
    /// Whose decision this is.
    pub agent_id: String,
    /// The decision, or why there is none.
    pub outcome: Result<Decision, DecisionError>,
}

impl PendingDecision {
    /// Whose decision this is.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The rendered perception text.
    pub fn perception(&self) -> &str {
        &self.perception
    }

    /// Call the brain within the policy's time budget.
    pub async fn think(self) -> Thought {
        let attempts = async {
            let mut last_error = None;
            for attempt in 0..=self.policy.max_retries {
                match self.brain.decide(&self.perception, &self.memory, &self.stats).await {
                    Ok(decision) => return Ok(decision),
                    Err(err) => {
                        debug!(agent_id = %self.agent_id, attempt, error = %err, "brain call failed");
                        last_error = Some(err);
                    }
                }
            }
            Err(last_error.unwrap_or_else(|| DecisionError::Unavailable {
                reason: "no attempt was made".to_owned(),
            }))
        };

        let outcome = bounded(self.policy.timeout, attempts).await;
        Thought {
            agent_id: self.agent_id,
            outcome,
        }
    }
}

/// Reflection input captured from committed state.
pub struct PendingReflection {
    agent_id: String,
    daily_log: String,
    brain: Arc<dyn Brain>,
    policy: DecisionPolicy,
}

impl PendingReflection {
    /// Whose reflection this is.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Ask the brain to reflect within the policy's time budget.
    pub async fn think(self) -> (String, Result<String, DecisionError>) {
        let outcome = bounded(self.policy.timeout, self.brain.reflect(&self.daily_log)).await;
        (self.agent_id, outcome)
    }
}

/// Run `work` with a deadline, mapping an elapsed deadline to
/// [`DecisionError::Timeout`].
async fn bounded<T>(
    budget: Duration,
    work: impl Future<Output = Result<T, DecisionError>>,
) -> Result<T, DecisionError> {
    timeout(budget, work).await.unwrap_or_else(|_elapsed| {
        Err(DecisionError::Timeout {
            deadline_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        })
    })
}
