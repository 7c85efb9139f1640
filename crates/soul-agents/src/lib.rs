//! Agent mechanics for the Digital Soul simulation.
//!
//! This crate contains the logic that operates on agent state without
//! touching I/O or decision providers. It sits between `soul-types` (the
//! data structures) and `soul-core` (orchestration).
//!
//! # Modules
//!
//! - [`config`] -- Tunables for settlement and memory ([`SettlementConfig`], [`MemoryConfig`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`lifecycle`] -- Awake/asleep/dead transitions at night and at 07:00
//! - [`memory`] -- [`MemoryStore`] trait and the [`RingMemory`] implementation
//! - [`settlement`] -- Per-tick stat-delta table, clamping, death, exhaustion

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod settlement;

// Re-export primary types at crate root for convenience.
pub use config::{MemoryConfig, SettlementConfig};
pub use error::AgentError;
pub use lifecycle::Transition;
pub use memory::{MemoryStore, RingMemory};
pub use settlement::{SettlementEngine, SettlementOutcome, StatDelta, apply_delta, deltas};
