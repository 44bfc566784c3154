//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::MonitorService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Monitor service for all business logic.
    pub monitor_service: Arc<MonitorService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds state around `service`, sharing its event bus.
    #[must_use]
    pub fn new(monitor_service: Arc<MonitorService>) -> Self {
        let event_bus = monitor_service.event_bus().clone();
        Self {
            monitor_service,
            event_bus,
        }
    }
}
