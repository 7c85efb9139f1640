//! World engine binary for the Digital Soul simulation.
//!
//! Wires configuration, the decision brain, the world engine, the seed
//! spawner, the optional automatic tick loop and the HTTP API together,
//! then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$SOUL_CONFIG` or `soul-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the brain selected by `llm.backend`
//! 4. Create the world and spawn seed agents
//! 5. Start the tick loop if `world.tick_interval_ms` is non-zero
//! 6. Serve the HTTP API until `Ctrl-C`
//! 7. Stop the tick loop and exit

mod error;
mod spawner;
mod ticker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use soul_core::config::LoggingConfig;
use soul_core::{NarrativeFormatter, SharedCapabilities, SimulationConfig, WorldEngine};
use soul_observer::{AppState, ServerConfig, start_server};
use soul_runner::build_brain;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Configuration file used when `SOUL_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "soul-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails or the API server
/// cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1-2. Configuration, then logging shaped by it.
    let (config, source) = load_config()?;
    init_logging(&config.logging);

    let origin = source
        .as_deref()
        .map_or_else(|| "defaults".to_owned(), |path| path.display().to_string());
    info!(source = %origin, "configuration loaded");
    info!(
        world_name = %config.world.name,
        language = config.world.language.code(),
        width = config.map.width,
        height = config.map.height,
        minutes_per_tick = config.time.minutes_per_tick,
        decision_timeout_ms = config.world.decision_timeout_ms,
        "soul-engine starting"
    );

    // 3. Brain.
    let brain = build_brain(&config.llm, config.world.language).map_err(AppError::from)?;
    let factory = SharedCapabilities::new(
        brain,
        Arc::new(NarrativeFormatter::new(config.world.language)),
        config.memory.store_config(),
    );

    // 4. World and seed agents.
    let mut engine = WorldEngine::new(&config, Arc::new(factory)).map_err(AppError::from)?;
    let spawned = spawner::spawn_seed_agents(&mut engine, &config.population)?;
    info!(agents = spawned.len(), time = %engine.clock().now(), "world ready");

    let engine = Arc::new(Mutex::new(engine));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 5. Tick loop.
    let ticker = (config.world.tick_interval_ms > 0).then(|| {
        tokio::spawn(ticker::run_tick_loop(
            Arc::clone(&engine),
            Duration::from_millis(config.world.tick_interval_ms),
            shutdown_rx,
        ))
    });
    if ticker.is_none() {
        info!("automatic ticking disabled, advance the world via POST /api/world/tick");
    }

    // 6. HTTP API.
    let state = Arc::new(AppState::shared(engine, config.world.language));
    let served = start_server(&ServerConfig::from(&config.observer), state, ctrl_c()).await;

    // 7. Shutdown.
    shutdown_tx.send(true).ok();
    if let Some(handle) = ticker
        && let Err(e) = handle.await
    {
        warn!(error = %e, "tick loop task failed");
    }
    served.map_err(AppError::from)?;

    info!("soul-engine shutdown complete");
    Ok(())
}

/// Resolve and load the configuration file.
///
/// Returns the config and the path it came from, or `None` when no file
/// exists and defaults (plus environment overrides) are used.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), AppError> {
    let path = std::env::var_os("SOUL_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok((config, None))
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over
/// `logging.level`.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolve once `Ctrl-C` is received.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
        return;
    }
    info!("Ctrl-C received, shutting down");
}
