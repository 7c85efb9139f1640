//! Brain trait and the rule-based implementation.
//!
//! During the decision pass the engine hands each awake agent's rendered
//! perception, its recent memory context, and a stats snapshot to a
//! [`Brain`] and waits for a [`Decision`]. At midnight it asks the same
//! brain to [`reflect`](Brain::reflect) on the day's log. The brain could
//! be an LLM backend, the deterministic [`RuleBrain`], or a test double.
//!
//! Brains are shared across agents (`Arc<dyn Brain>`) and called
//! concurrently, so implementations hold no per-agent state.

use async_trait::async_trait;
use soul_types::{ActionType, AgentStats, Decision, Language, translate};

/// Errors a brain call can produce. None of them stop a tick: the engine
/// substitutes a fallback and records the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    /// The brain answered, but the answer failed schema or enum validation.
    #[error("malformed decision: {reason}")]
    Malformed {
        /// What was wrong with the answer.
        reason: String,
    },

    /// The brain could not be reached or returned a transport error.
    #[error("brain unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },

    /// The call did not finish within the per-agent budget.
    #[error("brain call timed out after {deadline_ms}ms")]
    Timeout {
        /// The budget in milliseconds.
        deadline_ms: u64,
    },
}

/// A pluggable decision policy.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Choose an action given the agent's rendered perception, its memory
    /// context, and a snapshot of its stats.
    async fn decide(
        &self,
        perception: &str,
        memory: &str,
        stats: &AgentStats,
    ) -> Result<Decision, DecisionError>;

    /// Reflect on a day's log and return the agent's updated values.
    async fn reflect(&self, daily_log: &str) -> Result<String, DecisionError>;
}

// ---------------------------------------------------------------------------
// Rule brain
// ---------------------------------------------------------------------------

/// Energy below which the rule brain sleeps.
pub const TIRED_ENERGY: f64 = 20.0;

/// Wealth below which the rule brain works overtime.
pub const BROKE_WEALTH: f64 = 50.0;

/// Deterministic brain driven by two thresholds.
///
/// 1. `energy < 20` -> `SLEEP`
/// 2. `wealth < 50` -> `WORK_996`
/// 3. otherwise -> `REST_PARK`
///
/// Reflection always returns the same maxim. Thoughts are written in the
/// configured language.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBrain {
    language: Language,
}

impl RuleBrain {
    /// Create a rule brain speaking `language`.
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    /// The decision for `stats`, without the async wrapper.
    pub fn choose(&self, stats: &AgentStats) -> Decision {
        let (action, key) = if stats.energy < TIRED_ENERGY {
            (ActionType::Sleep, "thought.too_tired")
        } else if stats.wealth < BROKE_WEALTH {
            (ActionType::Work996, "thought.broke")
        } else {
            (ActionType::RestPark, "thought.chill")
        };
        Decision::new(action, translate(self.language, key))
    }
}

#[async_trait]
impl Brain for RuleBrain {
    async fn decide(
        &self,
        _perception: &str,
        _memory: &str,
        stats: &AgentStats,
    ) -> Result<Decision, DecisionError> {
        Ok(self.choose(stats))
    }

    async fn reflect(&self, _daily_log: &str) -> Result<String, DecisionError> {
        Ok(translate(self.language, "reflection.maxim").to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stats(energy: f64, wealth: f64) -> AgentStats {
        AgentStats {
            energy,
            wealth,
            ..AgentStats::default()
        }
    }

    #[tokio::test]
    async fn tired_agent_sleeps() {
        let brain = RuleBrain::default();
        let decision = brain.decide("", "", &stats(10.0, 100.0)).await.unwrap();
        assert_eq!(decision.action, ActionType::Sleep);
        assert_eq!(decision.thought, "I am too tired. I need to sleep.");
    }

    #[tokio::test]
    async fn broke_agent_works_overtime() {
        let brain = RuleBrain::default();
        let decision = brain.decide("", "", &stats(100.0, 10.0)).await.unwrap();
        assert_eq!(decision.action, ActionType::Work996);
    }

    #[tokio::test]
    async fn comfortable_agent_rests() {
        let brain = RuleBrain::default();
        let decision = brain.decide("", "", &stats(100.0, 100.0)).await.unwrap();
        assert_eq!(decision.action, ActionType::RestPark);
    }

    #[test]
    fn thresholds_are_strict() {
        let brain = RuleBrain::default();
        assert_eq!(brain.choose(&stats(20.0, 50.0)).action, ActionType::RestPark);
        assert_eq!(brain.choose(&stats(19.9, 0.0)).action, ActionType::Sleep);
    }

    #[tokio::test]
    async fn reflection_is_localized() {
        let brain = RuleBrain::new(Language::Zh);
        assert_eq!(brain.reflect("log").await.unwrap(), "健康就是财富。");
    }
}
