//! Error types for the `soul-engine` binary.
//!
//! [`AppError`] wraps every failure mode of startup and shutdown so
//! `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: soul_core::ConfigError,
    },

    /// The world could not be built or seeded.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: soul_core::EngineError,
    },

    /// The configured brain could not be built.
    #[error("brain error: {source}")]
    Brain {
        /// The underlying backend error.
        #[from]
        source: soul_runner::RunnerError,
    },

    /// Seed agents could not be placed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },

    /// The HTTP API failed to bind or serve.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: soul_observer::ServerError,
    },
}
