//! Queue handlers: feed, stats, broker queue info, publish.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LimitParams, ListResponse, PublishRequest, PublishResponse};
use crate::app_state::AppState;
use crate::clients::QueueInfo;
use crate::domain::{QueueMessage, QueueStats};
use crate::error::{ErrorResponse, MonitorError};

/// `GET /queue/messages` — Queue feed, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/queue/messages",
    tag = "Queue",
    summary = "List queue messages",
    description = "Returns the rolling queue feed, newest first. Omit `limit` for the whole feed.",
    params(LimitParams),
    responses(
        (status = 200, description = "Queue messages", body = ListResponse<QueueMessage>),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let messages = state.monitor_service.queue_messages(params.clamped()).await;
    Json(ListResponse::from(messages))
}

/// `GET /queue/stats` — Per-queue and per-status counts.
#[utoipa::path(
    get,
    path = "/api/v1/queue/stats",
    tag = "Queue",
    summary = "Queue feed statistics",
    description = "Counts the messages currently in the queue feed by queue name and by status.",
    responses(
        (status = 200, description = "Queue statistics", body = QueueStats),
    )
)]
pub async fn queue_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.queue_stats().await)
}

/// `GET /queues/{queue}` — Broker counters for one queue.
///
/// # Errors
///
/// Returns [`MonitorError::BrokerUnavailable`] if the broker is down.
#[utoipa::path(
    get,
    path = "/api/v1/queues/{queue}",
    tag = "Queue",
    summary = "Broker queue info",
    description = "Returns the message count, consumer count and publish rate the broker reports for `queue`.",
    params(
        ("queue" = String, Path, description = "Queue name, e.g. `email-queue`"),
    ),
    responses(
        (status = 200, description = "Queue info", body = QueueInfo),
        (status = 503, description = "Broker unavailable", body = ErrorResponse),
    )
)]
pub async fn queue_info(
    State(state): State<AppState>,
    Path(queue): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let info = state
        .monitor_service
        .queue_info(&queue)
        .ok_or_else(|| MonitorError::BrokerUnavailable(format!("cannot inspect {queue}")))?;
    Ok(Json(info))
}

/// `POST /queues/{queue}/messages` — Publish a message.
///
/// # Errors
///
/// Returns [`MonitorError::BrokerUnavailable`] if the broker refused.
#[utoipa::path(
    post,
    path = "/api/v1/queues/{queue}/messages",
    tag = "Queue",
    summary = "Publish a message",
    description = "Publishes through the broker and records the PENDING message in the queue feed.",
    params(
        ("queue" = String, Path, description = "Target queue name"),
    ),
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Message accepted", body = PublishResponse),
        (status = 503, description = "Broker unavailable", body = ErrorResponse),
    )
)]
pub async fn publish_message(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    if queue.trim().is_empty() {
        return Err(MonitorError::InvalidRequest(
            "queue name must not be empty".to_string(),
        ));
    }
    let (payload, options) = req.into_parts();
    let message = state
        .monitor_service
        .publish_message(&queue, payload, options)
        .await
        .ok_or_else(|| MonitorError::BrokerUnavailable(format!("cannot publish to {queue}")))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            accepted: true,
            message,
        }),
    ))
}

/// Queue routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/queue/messages", get(list_messages))
        .route("/queue/stats", get(queue_stats))
        .route("/queues/{queue}", get(queue_info))
        .route("/queues/{queue}/messages", post(publish_message))
}
