//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    LogStreamRequest, LogStreamResponse, PublishRequest, PublishResponse,
    SendEmailRequest, SendEmailResponse, TrackEmailEventRequest,
};
use super::handlers::{dashboard, email, events, logs, queue, system};
use crate::clients::{DeliveryStats, PublishOptions, QueueInfo};
use crate::domain::{
    DatabaseEvent, DbOperation, DbStatus, EmailEvent, EmailStats, EmailStatus, LogEntry, LogLevel,
    LogSource, QueueMessage, QueueStats, QueueStatus, StoreMetrics, SystemMetrics,
};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::{DashboardSnapshot, GeneratedBatch};

/// Generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "tracking-monitor",
        description = "Mock database, queue and email event feed with rolling metrics."
    ),
    paths(
        system::health_handler,
        system::catalogs_handler,
        dashboard::get_dashboard,
        dashboard::get_metrics,
        dashboard::refresh,
        events::list_events,
        events::event_metrics,
        events::events_by_table,
        events::events_by_type,
        queue::list_messages,
        queue::queue_stats,
        queue::queue_info,
        queue::publish_message,
        email::list_emails,
        email::email_stats,
        email::send_email,
        email::delivery_stats,
        email::track_event,
        logs::list_logs,
        logs::set_log_stream,
    ),
    components(schemas(
        DatabaseEvent,
        DbOperation,
        DbStatus,
        QueueMessage,
        QueueStatus,
        EmailEvent,
        EmailStatus,
        LogEntry,
        LogLevel,
        LogSource,
        SystemMetrics,
        StoreMetrics,
        QueueStats,
        EmailStats,
        QueueInfo,
        DeliveryStats,
        PublishOptions,
        DashboardSnapshot,
        GeneratedBatch,
        PublishRequest,
        PublishResponse,
        SendEmailRequest,
        SendEmailResponse,
        TrackEmailEventRequest,
        LogStreamRequest,
        LogStreamResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Health and catalogs"),
        (name = "Dashboard", description = "Snapshot, metrics and refresh"),
        (name = "Events", description = "Database event log"),
        (name = "Queue", description = "Queue feed and broker"),
        (name = "Email", description = "Email feed and provider"),
        (name = "Logs", description = "System log stream"),
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI document.
#[must_use]
pub fn api_doc() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
