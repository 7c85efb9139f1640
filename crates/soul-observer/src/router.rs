//! Axum router construction for the Observer API.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for
//! cross-origin dashboard access and HTTP tracing on every request.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the Observer server.
///
/// See the [`handlers`] module for the endpoint table.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        // World
        .route("/api/world/status", get(handlers::world_status))
        .route("/api/world/tick", post(handlers::advance))
        .route("/api/world/reset", post(handlers::reset))
        // Agents
        .route(
            "/api/agents",
            get(handlers::list_agents).post(handlers::create_agent),
        )
        .route("/api/agents/{id}", get(handlers::get_agent))
        .route("/api/agents/{id}/thought", get(handlers::get_thought))
        .route("/api/agents/{id}/history", get(handlers::get_history))
        .route("/api/agents/{id}/action", post(handlers::set_action))
        // Admin
        .route("/api/admin/inject-event", post(handlers::inject_event))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
