//! Automatic tick loop.
//!
//! Advances the shared world once per period until the shutdown flag
//! flips. Each tick holds the engine lock for its whole duration, so API
//! requests interleave between ticks, never inside one.

use std::sync::Arc;
use std::time::Duration;

use soul_core::WorldEngine;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Tick `engine` every `period` until `shutdown` becomes `true` or its
/// sender is dropped. Returns the number of ticks run.
pub async fn run_tick_loop(
    engine: Arc<Mutex<WorldEngine>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately.
    interval.tick().await;

    info!(period_ms = period.as_millis(), "tick loop started");
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut world = engine.lock().await;
                let summary = world.tick().await;
                drop(world);
                ticks = ticks.saturating_add(1);

                debug!(
                    time = %summary.time,
                    decisions = summary.decisions.len(),
                    fallbacks = summary.fallbacks,
                    active_agents = summary.active_agents,
                    "tick complete"
                );
                if !summary.deaths.is_empty() {
                    warn!(time = %summary.time, deaths = ?summary.deaths, "agents died");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(ticks, "tick loop stopped");
    ticks
}
