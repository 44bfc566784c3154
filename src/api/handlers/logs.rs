//! System log handlers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{LimitParams, ListResponse, LogStreamRequest, LogStreamResponse};
use crate::app_state::AppState;
use crate::domain::LogEntry;

/// `GET /logs` — System log feed, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/logs",
    tag = "Logs",
    summary = "List system log entries",
    description = "Returns the rolling system log feed, newest first.",
    params(LimitParams),
    responses(
        (status = 200, description = "Log entries", body = ListResponse<LogEntry>),
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let entries = state.monitor_service.log_entries(params.clamped()).await;
    Json(ListResponse::from(entries))
}

/// `PUT /logs/stream` — Pause or resume the log stream.
#[utoipa::path(
    put,
    path = "/api/v1/logs/stream",
    tag = "Logs",
    summary = "Toggle the log stream",
    description = "While paused the system log task produces nothing. Existing entries are kept.",
    request_body = LogStreamRequest,
    responses(
        (status = 200, description = "New stream state", body = LogStreamResponse),
    )
)]
pub async fn set_log_stream(
    State(state): State<AppState>,
    Json(req): Json<LogStreamRequest>,
) -> impl IntoResponse {
    state.monitor_service.set_log_stream_active(req.active).await;
    Json(LogStreamResponse {
        active: state.monitor_service.log_stream_active().await,
    })
}

/// Log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/stream", put(set_log_stream))
}
