//! Tunables for agent mechanics.
//!
//! The engine builds these from the YAML configuration at startup and
//! passes them into the settlement engine and memory stores.

/// Settlement behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementConfig {
    /// When energy reaches 0, force the agent to sleep (default: true).
    ///
    /// With this off, running out of energy has no consequence beyond the
    /// clamped stat.
    pub exhaustion_forces_sleep: bool,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            exhaustion_forces_sleep: true,
        }
    }
}

/// Memory store sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Entries kept in the short-term ring buffer (default: 20).
    pub short_term_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: 20,
        }
    }
}
