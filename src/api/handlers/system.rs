//! System endpoints: health check and the value catalogs.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{DbOperation, DbStatus, EmailStatus, QueueStatus, Topic};
use crate::generator::{QUEUES, TABLES};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Values the monitor can produce, for building dashboard filters.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    tables: Vec<String>,
    queues: Vec<String>,
    event_types: Vec<DbOperation>,
    event_statuses: Vec<DbStatus>,
    queue_statuses: Vec<QueueStatus>,
    email_statuses: Vec<EmailStatus>,
    topics: Vec<String>,
}

/// `GET /config/catalogs` — List the fixed value catalogs.
#[utoipa::path(
    get,
    path = "/config/catalogs",
    tag = "System",
    summary = "List value catalogs",
    description = "Returns the tables, queues, statuses and WebSocket topics the monitor uses.",
    responses(
        (status = 200, description = "Value catalogs", body = CatalogResponse),
    )
)]
pub async fn catalogs_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(CatalogResponse {
            tables: TABLES.iter().map(ToString::to_string).collect(),
            queues: QUEUES.iter().map(ToString::to_string).collect(),
            event_types: DbOperation::ALL.to_vec(),
            event_statuses: DbStatus::ALL.to_vec(),
            queue_statuses: QueueStatus::ALL.to_vec(),
            email_statuses: EmailStatus::ALL.to_vec(),
            topics: Topic::ALL.iter().map(ToString::to_string).collect(),
        }),
    )
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/catalogs", get(catalogs_handler))
}
