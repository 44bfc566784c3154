//! Dashboard handlers: snapshot, metrics, manual refresh.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::SystemMetrics;
use crate::service::{DashboardSnapshot, GeneratedBatch};

/// `GET /dashboard` — Everything the dashboard renders.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    summary = "Dashboard snapshot",
    description = "Returns the displayed database events, both rolling feeds and the latest metrics, captured together.",
    responses(
        (status = 200, description = "Dashboard snapshot", body = DashboardSnapshot),
    )
)]
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.dashboard().await)
}

/// `GET /metrics` — Latest metrics snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    tag = "Dashboard",
    summary = "Latest metrics",
    description = "Returns the snapshot computed by the last metrics tick. It is not recomputed on read.",
    responses(
        (status = 200, description = "Metrics snapshot", body = SystemMetrics),
    )
)]
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.metrics().await)
}

/// `POST /refresh` — Generate one batch and recompute metrics.
#[utoipa::path(
    post,
    path = "/api/v1/refresh",
    tag = "Dashboard",
    summary = "Manual refresh",
    description = "Runs one generation tick immediately, then recomputes the metrics snapshot.",
    responses(
        (status = 200, description = "Records generated by the refresh", body = GeneratedBatch),
    )
)]
pub async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.refresh().await)
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/metrics", get(get_metrics))
        .route("/refresh", post(refresh))
}
