//! Database event handlers: list, metrics, filters.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{LimitParams, ListResponse};
use crate::app_state::AppState;
use crate::domain::{DatabaseEvent, DbOperation, StoreMetrics};
use crate::error::{ErrorResponse, MonitorError};

/// `GET /events` — Most recent database events.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List database events",
    description = "Returns stored events newest first. `limit` defaults to the configured event limit.",
    params(LimitParams),
    responses(
        (status = 200, description = "Database events", body = ListResponse<DatabaseEvent>),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let events = state.monitor_service.database_events(params.clamped()).await;
    Json(ListResponse::from(events))
}

/// `GET /events/metrics` — Aggregates over the whole event log.
#[utoipa::path(
    get,
    path = "/api/v1/events/metrics",
    tag = "Events",
    summary = "Event store metrics",
    description = "Returns total count, error rate, success rate and mean duration over every stored event.",
    responses(
        (status = 200, description = "Store metrics", body = StoreMetrics),
    )
)]
pub async fn event_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.store_metrics().await)
}

/// `GET /events/tables/{table}` — Events on one table.
#[utoipa::path(
    get,
    path = "/api/v1/events/tables/{table}",
    tag = "Events",
    summary = "Events by table",
    description = "Returns every stored event on `table` in insertion order. Unknown tables yield an empty list.",
    params(
        ("table" = String, Path, description = "Table name, e.g. `users`"),
    ),
    responses(
        (status = 200, description = "Matching events", body = ListResponse<DatabaseEvent>),
    )
)]
pub async fn events_by_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> impl IntoResponse {
    let events = state.monitor_service.events_by_table(&table).await;
    Json(ListResponse::from(events))
}

/// `GET /events/types/{type}` — Events of one operation type.
///
/// # Errors
///
/// Returns [`MonitorError::UnknownEventType`] if `type` is not an operation.
#[utoipa::path(
    get,
    path = "/api/v1/events/types/{type}",
    tag = "Events",
    summary = "Events by operation type",
    description = "Returns every stored event of the given operation in insertion order. Matching is case-insensitive.",
    params(
        ("type" = String, Path, description = "INSERT, UPDATE, DELETE or SELECT"),
    ),
    responses(
        (status = 200, description = "Matching events", body = ListResponse<DatabaseEvent>),
        (status = 400, description = "Unknown operation type", body = ErrorResponse),
    )
)]
pub async fn events_by_type(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let kind: DbOperation = kind.parse()?;
    let events = state.monitor_service.events_by_type(kind).await;
    Ok(Json(ListResponse::from(events)))
}

/// Database event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/metrics", get(event_metrics))
        .route("/events/tables/{table}", get(events_by_table))
        .route("/events/types/{type}", get(events_by_type))
}
