//! WebSocket server + REST endpoints for workflows and runs.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, Error, RegistryError, StoreError};
use crate::flows::{WorkflowDefinition, WorkflowStep};
use crate::runs::engine::Completion;
use crate::runs::instance::WorkflowInstance;
use crate::runs::sessions::{RunEvent, RunSessions};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RunSessions>,
}

/// Build the Axum router with run REST and WebSocket routes.
pub fn run_routes(sessions: Arc<RunSessions>) -> Router {
    let state = AppState { sessions };

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/api/flows", get(list_flows))
        .route("/api/flows/{id}", get(get_flow))
        .route("/api/runs", post(start_run))
        .route("/api/runs/{id}", get(get_run))
        .route("/api/runs/{id}/advance", post(advance_run))
        .route("/api/runs/{id}/cancel", post(cancel_run))
        .with_state(state)
}

/// A run plus the presenter-facing hints of the step it sits on.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run: WorkflowInstance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<WorkflowStep>,
}

fn snapshot(sessions: &RunSessions, run: WorkflowInstance) -> RunSnapshot {
    let current_step = sessions.registry().get(&run.definition_id).and_then(|def| {
        run.current_step_id
            .as_deref()
            .and_then(|step_id| def.step(step_id).cloned())
    });
    RunSnapshot { run, current_step }
}

fn error_response(err: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match err {
        Error::Registry(RegistryError::NotFound { .. })
        | Error::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Error::Engine(EngineError::InvalidState { .. }) => StatusCode::CONFLICT,
        Error::Engine(EngineError::MissingDecision { .. })
        | Error::Engine(EngineError::FieldsRejected { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "arcflow"
    }))
}

// ── Flows ───────────────────────────────────────────────────────────────

/// Directory entry for one registered workflow.
#[derive(Debug, Clone, Serialize)]
struct FlowSummary {
    id: String,
    label: String,
    version: u32,
    step_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_mode: Option<String>,
}

impl From<&WorkflowDefinition> for FlowSummary {
    fn from(def: &WorkflowDefinition) -> Self {
        Self {
            id: def.id.clone(),
            label: def.label.clone(),
            version: def.version,
            step_count: def.steps.len(),
            chat_mode: def.chat_mode.clone(),
        }
    }
}

async fn list_flows(State(state): State<AppState>) -> impl IntoResponse {
    let flows: Vec<FlowSummary> = state
        .sessions
        .registry()
        .list()
        .iter()
        .map(|def| FlowSummary::from(def.as_ref()))
        .collect();
    Json(flows)
}

async fn get_flow(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.sessions.registry().get(&id) {
        Some(def) => Json(def.as_ref().clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Unknown workflow id '{id}'")})),
        )
            .into_response(),
    }
}

// ── Runs ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StartRunRequest {
    workflow_id: String,
}

async fn start_run(
    State(state): State<AppState>,
    Json(body): Json<StartRunRequest>,
) -> impl IntoResponse {
    match state.sessions.start_run(&body.workflow_id).await {
        Ok(run) => {
            let snap = snapshot(&state.sessions, run);
            (StatusCode::CREATED, Json(snap)).into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}

async fn get_run(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let run_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid run ID"})),
            )
                .into_response();
        }
    };

    match state.sessions.get_run(run_id).await {
        Ok(run) => Json(snapshot(&state.sessions, run)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn advance_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(completion): Json<Completion>,
) -> impl IntoResponse {
    let run_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid run ID"})),
            )
                .into_response();
        }
    };

    match state.sessions.advance_run(run_id, &completion).await {
        Ok(run) => Json(snapshot(&state.sessions, run)).into_response(),
        Err(e) => {
            warn!(run_id = %run_id, error = %e, "Advance rejected");
            error_response(&e).into_response()
        }
    }
}

async fn cancel_run(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let run_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid run ID"})),
            )
                .into_response();
        }
    };

    match state.sessions.cancel_run(run_id).await {
        Ok(run) => Json(snapshot(&state.sessions, run)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

// ── WebSocket ───────────────────────────────────────────────────────────

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket client connecting");
    ws.on_upgrade(|socket| handle_socket(socket, state.sessions))
}

async fn handle_socket(mut socket: WebSocket, sessions: Arc<RunSessions>) {
    info!("WebSocket client connected");

    // Send all live runs on connect
    if !send_sync(&mut socket, &sessions).await {
        warn!("Failed to send initial sync, client disconnected");
        return;
    }

    // Subscribe to broadcast channel for real-time updates
    let mut rx = sessions.subscribe();

    loop {
        tokio::select! {
            // Forward run events to this client
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Ok(json) = serde_json::to_string(&event) {
                            if socket.send(Message::Text(json.into())).await.is_err() {
                                debug!("Client disconnected during send");
                                break;
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "WS client lagged behind broadcast");
                        if !send_sync(&mut socket, &sessions).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }

            // Runs are driven over REST; the socket only carries events out
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        debug!(text = %text, "Ignoring inbound WS message");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket connection closed");
}

async fn send_sync(socket: &mut WebSocket, sessions: &RunSessions) -> bool {
    let runs = match sessions.live_runs().await {
        Ok(runs) => runs,
        Err(e) => {
            warn!(error = %e, "Failed to list live runs for sync");
            return false;
        }
    };
    let sync = RunEvent::RunsSync { runs };
    match serde_json::to_string(&sync) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    }
}
