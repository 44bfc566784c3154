//! Email handlers: feed, stats, send, provider delivery stats.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    LimitParams, ListResponse, SendEmailRequest, SendEmailResponse, TrackEmailEventRequest,
};
use crate::app_state::AppState;
use crate::clients::DeliveryStats;
use crate::domain::{EmailEvent, EmailStats};
use crate::error::{ErrorResponse, MonitorError};

/// `GET /emails` — Email feed, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/emails",
    tag = "Email",
    summary = "List email events",
    description = "Returns the rolling email feed, newest first. Omit `limit` for the whole feed.",
    params(LimitParams),
    responses(
        (status = 200, description = "Email events", body = ListResponse<EmailEvent>),
    )
)]
pub async fn list_emails(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let emails = state.monitor_service.email_events(params.clamped()).await;
    Json(ListResponse::from(emails))
}

/// `GET /emails/stats` — Delivery breakdown over the email feed.
#[utoipa::path(
    get,
    path = "/api/v1/emails/stats",
    tag = "Email",
    summary = "Email statistics",
    description = "Counts delivered, opened, clicked, bounced and failed emails in the feed, plus the lifetime number of tracked emails.",
    responses(
        (status = 200, description = "Email statistics", body = EmailStats),
    )
)]
pub async fn email_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor_service.email_stats().await)
}

/// `POST /emails` — Send an email through the provider.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidRequest`] on a malformed body and
/// [`MonitorError::EmailProviderUnavailable`] if the provider refused.
#[utoipa::path(
    post,
    path = "/api/v1/emails",
    tag = "Email",
    summary = "Send an email",
    description = "Sends through the email provider and records the resulting event in the email feed.",
    request_body = SendEmailRequest,
    responses(
        (status = 201, description = "Email sent", body = SendEmailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Email provider unavailable", body = ErrorResponse),
    )
)]
pub async fn send_email(
    State(state): State<AppState>,
    Json(req): Json<SendEmailRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    req.validate()?;
    let email = state
        .monitor_service
        .send_email(
            req.to.trim(),
            &req.subject,
            &req.content,
            req.template_id.as_deref(),
        )
        .await
        .ok_or_else(|| MonitorError::EmailProviderUnavailable("send rejected".to_string()))?;

    Ok((StatusCode::CREATED, Json(SendEmailResponse { email })))
}

/// `GET /emails/{message_id}/stats` — Provider engagement counters.
///
/// # Errors
///
/// Returns [`MonitorError::EmailNotFound`] if the provider has no such
/// message and [`MonitorError::EmailProviderUnavailable`] during an outage.
#[utoipa::path(
    get,
    path = "/api/v1/emails/{message_id}/stats",
    tag = "Email",
    summary = "Delivery stats for one email",
    description = "Asks the email provider for opens, clicks and status of a message it sent.",
    params(
        ("message_id" = String, Path, description = "Provider message ID, e.g. `msg_...`"),
    ),
    responses(
        (status = 200, description = "Delivery stats", body = DeliveryStats),
        (status = 404, description = "Unknown message", body = ErrorResponse),
        (status = 503, description = "Email provider unavailable", body = ErrorResponse),
    )
)]
pub async fn delivery_stats(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, MonitorError> {
    let stats = state.monitor_service.email_delivery_stats(&message_id)?;
    Ok(Json(stats))
}

/// `POST /emails/{message_id}/events` — Record an engagement webhook.
///
/// # Errors
///
/// Returns [`MonitorError::InvalidRequest`] if `event` is blank.
#[utoipa::path(
    post,
    path = "/api/v1/emails/{message_id}/events",
    tag = "Email",
    summary = "Track an email event",
    description = "Hands a provider webhook event (open, click, bounce...) to the email provider, which logs it.",
    params(
        ("message_id" = String, Path, description = "Provider message ID"),
    ),
    request_body = TrackEmailEventRequest,
    responses(
        (status = 202, description = "Event accepted"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn track_event(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Json(req): Json<TrackEmailEventRequest>,
) -> Result<impl IntoResponse, MonitorError> {
    let event = req.event.trim();
    if event.is_empty() {
        return Err(MonitorError::InvalidRequest(
            "event must not be empty".to_string(),
        ));
    }
    state.monitor_service.track_email_event(&message_id, event);
    Ok(StatusCode::ACCEPTED)
}

/// Email routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/emails", get(list_emails).post(send_email))
        .route("/emails/stats", get(email_stats))
        .route("/emails/{message_id}/stats", get(delivery_stats))
        .route("/emails/{message_id}/events", post(track_event))
}
