//! REST API endpoint handlers for the Observer server.
//!
//! Every handler locks the shared [`WorldEngine`](soul_core::WorldEngine)
//! for the duration of the request. Display strings follow the `lang`
//! query parameter (`en` or `zh`), falling back to the world's language.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/world/status` | Clock, weather, day/night, population |
//! | `POST` | `/api/world/tick` | Advance `{ticks}` ticks |
//! | `POST` | `/api/world/reset` | Rebuild the world from configuration |
//! | `POST` | `/api/agents` | Create an agent `{id, x, y}` |
//! | `GET` | `/api/agents` | List agents (`?status=alive\|dead\|all`) |
//! | `GET` | `/api/agents/{id}` | Agent detail with recent memory |
//! | `GET` | `/api/agents/{id}/thought` | Latest thought |
//! | `GET` | `/api/agents/{id}/history` | Archived days, today's log, values |
//! | `POST` | `/api/agents/{id}/action` | Override the current action (a sleeper stays asleep) |
//! | `POST` | `/api/admin/inject-event` | Deliver an event note |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use soul_types::{
    ActionType, AgentStats, Entity, GameTime, Language, LifeState, translate, translate_with,
};

use crate::error::ObserverError;
use crate::state::AppState;

/// Upper bound on ticks advanced by one `POST /api/world/tick`.
pub const MAX_TICKS_PER_REQUEST: u32 = 1440;

// ---------------------------------------------------------------------------
// Query parameter and body structs
// ---------------------------------------------------------------------------

/// `?lang=` parameter accepted by every endpoint.
#[derive(Debug, Default, serde::Deserialize)]
pub struct LangQuery {
    /// `en` or `zh`.
    pub lang: Option<String>,
}

/// Query parameters for `GET /api/agents`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct AgentsQuery {
    /// Filter by `alive`, `dead` or `all` (default).
    pub status: Option<String>,
    /// `en` or `zh`.
    pub lang: Option<String>,
}

/// Body of `POST /api/world/tick`.
#[derive(Debug, serde::Deserialize)]
pub struct TickRequest {
    /// Number of ticks to run (default 1).
    #[serde(default = "one_tick")]
    pub ticks: u32,
}

const fn one_tick() -> u32 {
    1
}

/// Body of `POST /api/agents`.
#[derive(Debug, serde::Deserialize)]
pub struct CreateAgentRequest {
    /// Unique agent id.
    pub id: String,
    /// Starting column.
    pub x: i32,
    /// Starting row.
    pub y: i32,
}

/// Body of `POST /api/agents/{id}/action`.
#[derive(Debug, serde::Deserialize)]
pub struct SetActionRequest {
    /// Wire name of the action, e.g. `REST_PARK`.
    pub action: String,
}

/// Body of `POST /api/admin/inject-event`.
#[derive(Debug, serde::Deserialize)]
pub struct InjectEventRequest {
    /// Event category, e.g. `market_crash`.
    #[serde(rename = "type")]
    pub kind: String,
    /// What happened.
    pub description: String,
    /// Recipients; every agent when absent.
    pub target_agents: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Response views
// ---------------------------------------------------------------------------

/// JSON projection of an agent entity.
#[derive(Debug, serde::Serialize)]
pub struct AgentView {
    /// Agent id.
    pub id: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Awake, asleep or dead.
    pub state: LifeState,
    /// Current stats.
    pub stats: AgentStats,
    /// Wire name of the current action.
    pub current_action: ActionType,
    /// Localized label of the current action.
    pub action_label: &'static str,
    /// Guiding values.
    pub values: String,
}

impl AgentView {
    fn from_entity(entity: &Entity, language: Language) -> Option<Self> {
        let agent = entity.as_agent()?;
        Some(Self {
            id: entity.id.clone(),
            x: entity.x,
            y: entity.y,
            state: agent.life_state(),
            stats: agent.stats,
            current_action: agent.current_action,
            action_label: agent.current_action.display_name(language),
            values: agent.values.clone(),
        })
    }
}

/// Response of `GET /api/world/status`.
#[derive(Debug, serde::Serialize)]
pub struct WorldStatus {
    /// Current in-world time.
    pub time: GameTime,
    /// `YYYY-MM-DD HH:MM`.
    pub clock: String,
    /// e.g. "Morning, 08:00".
    pub time_of_day: String,
    /// Ticks since the last reset.
    pub ticks: u64,
    /// Current weather.
    pub weather: String,
    /// Whether agents are forced to sleep.
    pub is_night: bool,
    /// Living agents.
    pub active_agents: usize,
    /// All agents, dead included.
    pub total_agents: usize,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the world clock and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = state.engine.lock().await;
    let clock = engine.clock().now();
    let period = engine.clock().time_of_day();
    let weather = engine.weather().to_owned();
    let active = engine.active_agent_count();
    let total = engine.agents().count();
    let phase = if engine.is_night() { "NIGHT" } else { "DAY" };
    drop(engine);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Digital Soul</title>
    <style>
        body {{
            background: #101418;
            color: #d0d7de;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 760px;
            margin: 0 auto;
        }}
        h1 {{ color: #79c0ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #79c0ff; font-size: 1.4rem; font-weight: bold; }}
        code {{ color: #7ee787; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Digital Soul</h1>
    <p class="subtitle">World engine status</p>

    <div>
        <div class="metric"><div class="label">Time</div><div class="value">{clock}</div></div>
        <div class="metric"><div class="label">Period</div><div class="value">{period} ({phase})</div></div>
        <div class="metric"><div class="label">Weather</div><div class="value">{weather}</div></div>
        <div class="metric"><div class="label">Agents</div><div class="value">{active}/{total}</div></div>
    </div>

    <h2>API</h2>
    <ul>
        <li><code>GET  /api/world/status</code></li>
        <li><code>POST /api/world/tick</code> {{"ticks": n}}</li>
        <li><code>POST /api/world/reset</code></li>
        <li><code>GET  /api/agents</code> / <code>POST /api/agents</code> {{"id", "x", "y"}}</li>
        <li><code>GET  /api/agents/{{id}}</code>, <code>/thought</code>, <code>/history</code></li>
        <li><code>POST /api/agents/{{id}}/action</code> {{"action"}}</li>
        <li><code>POST /api/admin/inject-event</code> {{"type", "description", "target_agents"}}</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Return the clock, weather and population.
pub async fn world_status(State(state): State<Arc<AppState>>) -> Json<WorldStatus> {
    let engine = state.engine.lock().await;
    Json(WorldStatus {
        time: engine.clock().now(),
        clock: engine.clock().now().to_string(),
        time_of_day: engine.clock().describe(),
        ticks: engine.clock().ticks(),
        weather: engine.weather().to_owned(),
        is_night: engine.is_night(),
        active_agents: engine.active_agent_count(),
        total_agents: engine.agents().count(),
    })
}

/// Advance the world by `ticks` ticks and return the last tick's summary.
pub async fn advance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    Json(body): Json<TickRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    if !(1..=MAX_TICKS_PER_REQUEST).contains(&body.ticks) {
        return Err(ObserverError::BadRequest(format!(
            "ticks must be between 1 and {MAX_TICKS_PER_REQUEST}, got {}",
            body.ticks
        )));
    }

    let mut engine = state.engine.lock().await;
    let summary = engine.run_agent_loop(body.ticks).await;
    let ticks = body.ticks.to_string();

    Ok(Json(serde_json::json!({
        "message": translate_with(language, "message.advanced_ticks", &[("ticks", ticks.as_str())]),
        "time": engine.clock().now().to_string(),
        "summary": summary,
    })))
}

/// Discard every agent and rewind the clock.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let mut engine = state.engine.lock().await;
    engine.reset();

    Ok(Json(serde_json::json!({
        "message": translate(language, "message.world_reset"),
        "time": engine.clock().now().to_string(),
    })))
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Create an agent at a walkable cell.
pub async fn create_agent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    Json(body): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let id = body.id.trim();
    if id.is_empty() {
        return Err(ObserverError::BadRequest("agent id must not be empty".to_owned()));
    }

    let mut engine = state.engine.lock().await;
    engine.create_agent(id, body.x, body.y)?;
    let view = engine
        .agent(id)
        .and_then(|entity| AgentView::from_entity(entity, language))
        .ok_or_else(|| ObserverError::Internal(format!("agent {id} vanished after creation")))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": translate_with(language, "message.agent_created", &[("id", id)]),
            "agent": view,
        })),
    ))
}

/// List agents, optionally filtered by alive/dead status.
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AgentsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let filter = query.status.as_deref().unwrap_or("all");
    if !matches!(filter, "alive" | "dead" | "all") {
        return Err(ObserverError::BadRequest(format!("unknown status filter: {filter}")));
    }

    let engine = state.engine.lock().await;
    let agents: Vec<AgentView> = engine
        .agents()
        .filter_map(|entity| AgentView::from_entity(entity, language))
        .filter(|view| match filter {
            "alive" => view.state != LifeState::Dead,
            "dead" => view.state == LifeState::Dead,
            _ => true,
        })
        .collect();

    Ok(Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
    })))
}

/// Return one agent with its short-term memory and today's log.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let engine = state.engine.lock().await;

    let entity = engine
        .agent(&id)
        .ok_or_else(|| ObserverError::NotFound(format!("agent {id}")))?;
    let daily_log = entity
        .as_agent()
        .map(|agent| agent.daily_log.clone())
        .unwrap_or_default();
    let view = AgentView::from_entity(entity, language)
        .ok_or_else(|| ObserverError::NotFound(format!("agent {id}")))?;
    let memory = engine.recent_memory(&id)?;

    Ok(Json(serde_json::json!({
        "agent": view,
        "daily_log": daily_log,
        "recent_memory": memory,
    })))
}

/// Return the agent's latest thought, or a placeholder if it has none.
pub async fn get_thought(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let engine = state.engine.lock().await;

    let body = engine.latest_thought(&id)?.map_or_else(
        || {
            serde_json::json!({
                "id": id,
                "time": null,
                "thought": translate(language, "thought.none"),
            })
        },
        |record| {
            serde_json::json!({
                "id": id,
                "time": record.time.to_string(),
                "thought": record.text,
            })
        },
    );
    Ok(Json(body))
}

/// Return archived daily summaries, today's log and current values.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let engine = state.engine.lock().await;
    let history = engine.history(&id)?;

    Ok(Json(serde_json::json!({
        "id": id,
        "values": history.values,
        "current_log": history.current_log,
        "summaries": history.summaries,
    })))
}

/// Override an agent's current action until its next decision.
pub async fn set_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
    Json(body): Json<SetActionRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    let action: ActionType = body
        .action
        .parse()
        .map_err(|e: soul_types::UnknownAction| ObserverError::BadRequest(e.to_string()))?;

    let mut engine = state.engine.lock().await;
    engine.set_action(&id, action)?;

    Ok(Json(serde_json::json!({
        "message": translate_with(
            language,
            "message.action_set",
            &[("id", id.as_str()), ("action", action.display_name(language))],
        ),
        "action": action,
    })))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// Deliver an event note to the target agents, or to everyone.
///
/// Unknown targets are reported in the response; the others still
/// receive the note.
pub async fn inject_event(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
    Json(body): Json<InjectEventRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let language = resolve_language(&state, query.lang.as_deref())?;
    if body.kind.trim().is_empty() {
        return Err(ObserverError::BadRequest("event type must not be empty".to_owned()));
    }

    let mut engine = state.engine.lock().await;
    let delivery = engine.inject_event(
        body.kind.trim(),
        &body.description,
        body.target_agents.as_deref(),
    );
    let count = delivery.delivered.len().to_string();

    Ok(Json(serde_json::json!({
        "message": translate_with(language, "message.event_injected", &[("count", count.as_str())]),
        "delivered": delivery.delivered,
        "unknown": delivery.unknown,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve `?lang=`, falling back to the world's language.
fn resolve_language(state: &AppState, code: Option<&str>) -> Result<Language, ObserverError> {
    code.map_or(Ok(state.default_language), |code| {
        code.parse()
            .map_err(|e: soul_types::UnknownLanguage| ObserverError::BadRequest(e.to_string()))
    })
}
