//! Service layer: business logic orchestration.
//!
//! [`MonitorService`] owns the monitored collections, drives generation and
//! aggregation, and emits events through the [`super::domain::EventBus`].

pub mod monitor_service;

pub use monitor_service::{
    DEFAULT_BROKER_URL, DashboardSnapshot, GeneratedBatch, MonitorService, MonitorSettings,
};
