//! Error types for the LLM brain.
//!
//! Uses `thiserror` for typed errors that surface through the whole brain
//! pipeline: configuration, prompt rendering, LLM calls, response parsing.
//! At the [`Brain`](soul_core::Brain) boundary they collapse into a
//! [`DecisionError`].

use soul_core::DecisionError;

/// Errors that can occur while asking an LLM for a decision.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Failed to load or render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The LLM response could not be turned into a valid decision.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<RunnerError> for DecisionError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Parse(reason) => Self::Malformed { reason },
            other => Self::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}
