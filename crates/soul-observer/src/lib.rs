//! HTTP API for the Digital Soul world engine.
//!
//! A thin Axum adapter over [`WorldEngine`](soul_core::WorldEngine):
//! read the clock and agents, advance or reset the world, create agents,
//! override actions and inject events. It adds no simulation rules of
//! its own.
//!
//! # Modules
//!
//! - [`error`] -- [`ObserverError`] and its HTTP status mapping
//! - [`handlers`] -- endpoint handlers
//! - [`router`] -- route table with CORS and tracing layers
//! - [`server`] -- bind and serve with graceful shutdown
//! - [`state`] -- the shared engine handle

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
