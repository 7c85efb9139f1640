//! Error types for the `soul-agents` crate.
//!
//! Settlement and life-cycle helpers report why they left an agent
//! untouched instead of silently doing nothing, so the engine can tell an
//! unknown id apart from a dead agent.

/// Errors that can occur during agent state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// No entity with this id is registered, or it is not an agent.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// The agent is dead. Its record is frozen.
    #[error("agent {0} is inactive")]
    Inactive(String),
}
