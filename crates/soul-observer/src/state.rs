//! Shared application state for the Observer API server.
//!
//! The engine lives behind a [`tokio::sync::Mutex`] so the HTTP handlers
//! and the automatic tick loop take turns on the same world. Ticks hold
//! the lock across their decision pass; a request arriving mid-tick waits
//! for the tick to finish and never sees a half-settled world.

use std::sync::Arc;

use soul_core::WorldEngine;
use soul_types::Language;
use tokio::sync::Mutex;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The simulation.
    pub engine: Arc<Mutex<WorldEngine>>,
    /// Language used when a request carries no `lang` parameter.
    pub default_language: Language,
}

impl AppState {
    /// Wrap an engine that nothing else shares.
    pub fn new(engine: WorldEngine) -> Self {
        let default_language = engine.language();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            default_language,
        }
    }

    /// Share an engine with another owner, typically the tick loop.
    pub const fn shared(engine: Arc<Mutex<WorldEngine>>, default_language: Language) -> Self {
        Self {
            engine,
            default_language,
        }
    }
}
