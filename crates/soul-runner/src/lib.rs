//! LLM-backed decision making for the Digital Soul simulation.
//!
//! Implements the [`Brain`](soul_core::Brain) trait on top of
//! OpenAI-compatible and Anthropic chat APIs. Prompts are `minijinja`
//! templates; replies are parsed into typed decisions with a few recovery
//! strategies for sloppy JSON.
//!
//! # Modules
//!
//! - [`brain`] -- [`LlmBrain`] and the [`build_brain`] factory
//! - [`config`] -- Backend selection from the `llm` config section
//! - [`error`] -- [`RunnerError`] and its mapping onto decision errors
//! - [`llm`] -- HTTP backends
//! - [`parse`] -- Reply parsing into [`Decision`](soul_types::Decision)
//! - [`prompt`] -- Template loading and rendering

pub mod brain;
pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use brain::{LlmBrain, build_brain};
pub use config::{BackendType, LlmBackendConfig};
pub use error::RunnerError;
