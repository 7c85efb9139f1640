//! Configuration loading and typed config structures for the Digital Soul
//! simulation.
//!
//! The configuration lives in a YAML file (`soul-config.yaml` by default).
//! This module defines strongly-typed structs that mirror the YAML
//! structure and a loader that reads it. Every field has a default, so an
//! empty file is a valid configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use soul_agents::{MemoryConfig, SettlementConfig};
use soul_types::{GameTime, Language};
use soul_world::TerrainPatch;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, language, timing, concurrency).
    #[serde(default)]
    pub world: WorldConfig,

    /// Calendar settings.
    #[serde(default)]
    pub time: TimeConfig,

    /// Grid size and terrain layout.
    #[serde(default)]
    pub map: MapConfig,

    /// Memory store sizing.
    #[serde(default)]
    pub memory: MemorySection,

    /// Settlement switches.
    #[serde(default)]
    pub settlement: SettlementSection,

    /// Seed population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Decision backend selection.
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP API binding.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values afterwards, see
    /// [`SimulationConfig::apply_env_overrides`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override selected values from the process environment:
    ///
    /// - `SOUL_LANGUAGE` overrides `world.language` (ignored if unsupported)
    /// - `LLM_BACKEND`, `LLM_BASE_URL`, `LLM_API_KEY`, `LLM_MODEL` override
    ///   the matching `llm` fields
    /// - `OBSERVER_PORT` overrides `observer.port` (ignored if not a port)
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup instead of the process
    /// environment.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(language) = lookup("SOUL_LANGUAGE").and_then(|val| val.parse().ok()) {
            self.world.language = language;
        }
        if let Some(val) = lookup("LLM_BACKEND") {
            self.llm.backend = val;
        }
        if let Some(val) = lookup("LLM_BASE_URL") {
            self.llm.api_url = Some(val);
        }
        if let Some(val) = lookup("LLM_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Some(val) = lookup("LLM_MODEL") {
            self.llm.model = val;
        }
        if let Some(port) = lookup("OBSERVER_PORT").and_then(|val| val.parse().ok()) {
            self.observer.port = port;
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Language for agent-facing text.
    #[serde(default)]
    pub language: Language,

    /// Weather reported in every perception.
    #[serde(default = "default_weather")]
    pub weather: String,

    /// Real-time milliseconds between automatic ticks. 0 disables the
    /// automatic loop; the world then only advances through the API.
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Per-agent budget for one decision or reflection, retries included.
    #[serde(default = "default_decision_timeout_ms")]
    pub decision_timeout_ms: u64,

    /// Maximum brain calls in flight during one decision pass.
    #[serde(default = "default_max_concurrent_decisions")]
    pub max_concurrent_decisions: usize,

    /// Radius (in tiles) within which agents see other entities.
    #[serde(default = "default_perception_radius")]
    pub perception_radius: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            language: Language::default(),
            weather: default_weather(),
            tick_interval_ms: 0,
            decision_timeout_ms: default_decision_timeout_ms(),
            max_concurrent_decisions: default_max_concurrent_decisions(),
            perception_radius: default_perception_radius(),
        }
    }
}

/// Calendar configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// In-world minutes per tick. Must divide 60.
    #[serde(default = "default_minutes_per_tick")]
    pub minutes_per_tick: u32,

    /// Calendar time of a fresh world.
    #[serde(default)]
    pub start: GameTime,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            minutes_per_tick: default_minutes_per_tick(),
            start: GameTime::default(),
        }
    }
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    /// Columns.
    #[serde(default = "default_map_side")]
    pub width: i32,

    /// Rows.
    #[serde(default = "default_map_side")]
    pub height: i32,

    /// Terrain patches painted onto the fresh grid, in order.
    #[serde(default)]
    pub layout: Vec<TerrainPatch>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_side(),
            height: default_map_side(),
            layout: Vec::new(),
        }
    }
}

/// Memory configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemorySection {
    /// Short-term ring buffer capacity per agent.
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,

    /// Archived summaries returned by the history query.
    #[serde(default = "default_history_recall")]
    pub history_recall: usize,
}

impl MemorySection {
    /// Sizing for a single memory store.
    pub const fn store_config(&self) -> MemoryConfig {
        MemoryConfig {
            short_term_capacity: self.short_term_capacity,
        }
    }
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            short_term_capacity: default_short_term_capacity(),
            history_recall: default_history_recall(),
        }
    }
}

/// Settlement configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SettlementSection {
    /// Force sleep when energy reaches 0.
    #[serde(default = "default_true")]
    pub exhaustion_forces_sleep: bool,
}

impl From<SettlementSection> for SettlementConfig {
    fn from(section: SettlementSection) -> Self {
        Self {
            exhaustion_forces_sleep: section.exhaustion_forces_sleep,
        }
    }
}

impl Default for SettlementSection {
    fn default() -> Self {
        Self {
            exhaustion_forces_sleep: true,
        }
    }
}

/// Seed population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Agents spawned at startup.
    #[serde(default)]
    pub initial_agents: u32,

    /// Seed for placement randomness.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: 0,
            seed: default_seed(),
        }
    }
}

/// Decision backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmConfig {
    /// `rule`, `openai`, or `anthropic`.
    #[serde(default = "default_llm_backend")]
    pub backend: String,

    /// API base URL. Backend-specific default when unset.
    #[serde(default)]
    pub api_url: Option<String>,

    /// API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Extra attempts after a failed brain call, within the decision
    /// timeout.
    #[serde(default)]
    pub max_retries: u32,

    /// Sampling temperature for decisions.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Sampling temperature for reflections.
    #[serde(default = "default_reflection_temperature")]
    pub reflection_temperature: f64,

    /// Directory with prompt template overrides.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            api_url: None,
            api_key: None,
            model: default_model(),
            max_retries: 0,
            temperature: default_temperature(),
            reflection_temperature: default_reflection_temperature(),
            templates_dir: None,
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_world_name() -> String {
    "Digital Soul".to_owned()
}

fn default_weather() -> String {
    "Sunny".to_owned()
}

const fn default_decision_timeout_ms() -> u64 {
    10_000
}

const fn default_max_concurrent_decisions() -> usize {
    16
}

const fn default_perception_radius() -> u32 {
    3
}

const fn default_minutes_per_tick() -> u32 {
    1
}

const fn default_map_side() -> i32 {
    100
}

const fn default_short_term_capacity() -> usize {
    20
}

const fn default_history_recall() -> usize {
    10
}

const fn default_seed() -> u64 {
    42
}

fn default_llm_backend() -> String {
    "rule".to_owned()
}

fn default_model() -> String {
    "gpt-4o-mini".to_owned()
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_reflection_temperature() -> f64 {
    0.8
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
