//! Append-only log of database events.
//!
//! [`EventStore`] never deletes: the log grows for the lifetime of the
//! process. Identity and timestamps are assigned here, from the store's
//! [`Clock`].

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::{DatabaseEvent, DbOperation, DbStatus, NewDatabaseEvent, RecordId};
use crate::clock::Clock;

/// Number of events returned by [`EventStore::get_events`] when the caller
/// does not specify a limit.
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// Aggregates computed over the whole event log.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct StoreMetrics {
    /// Number of logged events.
    pub total_events: usize,
    /// Percentage of events with status `ERROR`.
    pub error_rate: f64,
    /// Mean event duration in milliseconds.
    pub avg_response_time: f64,
    /// Percentage of events with status `SUCCESS`.
    pub success_rate: f64,
}

/// In-memory database event log.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<DatabaseEvent>,
    clock: Arc<dyn Clock>,
}

impl EventStore {
    /// Creates an empty store stamping events with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Vec::new(),
            clock,
        }
    }

    /// Assigns an ID and the current time to `event`, appends it and
    /// returns the stored record.
    pub fn log_event(&mut self, event: NewDatabaseEvent) -> DatabaseEvent {
        let stored = DatabaseEvent::from_new(RecordId::new(), self.clock.now(), event);
        self.events.push(stored.clone());
        tracing::debug!(
            id = %stored.id,
            kind = %stored.kind,
            table = %stored.table,
            "database event logged"
        );
        stored
    }

    /// Returns up to `limit` events, newest timestamp first.
    ///
    /// Events sharing a timestamp come out in reverse insertion order, so
    /// repeated calls without writes in between return identical lists.
    #[must_use]
    pub fn get_events(&self, limit: usize) -> Vec<DatabaseEvent> {
        let mut newest_first: Vec<&DatabaseEvent> = self.events.iter().rev().collect();
        newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        newest_first.into_iter().take(limit).cloned().collect()
    }

    /// Returns every event on `table`, in insertion order.
    #[must_use]
    pub fn get_events_by_table(&self, table: &str) -> Vec<DatabaseEvent> {
        self.events
            .iter()
            .filter(|e| e.table == table)
            .cloned()
            .collect()
    }

    /// Returns every event of operation `kind`, in insertion order.
    #[must_use]
    pub fn get_events_by_type(&self, kind: DbOperation) -> Vec<DatabaseEvent> {
        self.events
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Computes totals and rates over the full log.
    ///
    /// Rates are 0 for an empty store. `success_rate` counts only `SUCCESS`
    /// events, so `PENDING` events lower it without raising `error_rate`.
    #[must_use]
    pub fn get_metrics(&self) -> StoreMetrics {
        let total = self.events.len();
        if total == 0 {
            return StoreMetrics::default();
        }

        let (errors, successes, duration_sum) =
            self.events
                .iter()
                .fold((0usize, 0usize, 0.0f64), |(err, ok, sum), e| match e.status {
                    DbStatus::Error => (err + 1, ok, sum + e.duration),
                    DbStatus::Success => (err, ok + 1, sum + e.duration),
                    DbStatus::Pending => (err, ok, sum + e.duration),
                });

        let total_f = total as f64;
        StoreMetrics {
            total_events: total,
            error_rate: errors as f64 / total_f * 100.0,
            avg_response_time: duration_sum / total_f,
            success_rate: successes as f64 / total_f * 100.0,
        }
    }

    /// Number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
