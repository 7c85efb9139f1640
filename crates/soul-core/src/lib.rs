//! World clock, tick cycle, and orchestration for the Digital Soul simulation.
//!
//! This crate owns the tick loop that drives the simulation: Clock,
//! Life cycle, Reflection, Decision, and Settlement.
//!
//! # Modules
//!
//! - [`clock`] -- World clock with tick counter, night window, wake-up and
//!   midnight instants, and time-of-day description.
//! - [`config`] -- Configuration loading from `soul-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`AgentController`]: per-agent life cycle and the
//!   perceive/decide/act/record cycle.
//! - [`decision`] -- [`Brain`] trait and [`RuleBrain`].
//! - [`engine`] -- [`WorldEngine`]: the two-phase tick orchestrator.
//! - [`perception`] -- Per-agent perception assembly and rendering.
//!
//! [`AgentController`]: controller::AgentController
//! [`Brain`]: decision::Brain
//! [`RuleBrain`]: decision::RuleBrain
//! [`WorldEngine`]: engine::WorldEngine

pub mod clock;
pub mod config;
pub mod controller;
pub mod decision;
pub mod engine;
pub mod perception;

pub use clock::{Clock, ClockError};
pub use config::{ConfigError, SimulationConfig};
pub use controller::{AgentController, Capabilities, DecisionPolicy, ThoughtRecord};
pub use decision::{Brain, DecisionError, RuleBrain};
pub use engine::{
    AgentHistory, CapabilityFactory, EngineError, EventDelivery, SharedCapabilities, TickSummary,
    WorldEngine,
};
pub use perception::{NarrativeFormatter, PerceptionFormatter};
