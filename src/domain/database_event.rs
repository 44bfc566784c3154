//! Database events recorded in the [`super::EventStore`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RecordId;
use crate::error::MonitorError;

/// SQL operation kind of a database event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DbOperation {
    /// Row insertion.
    Insert,
    /// Row update.
    Update,
    /// Row deletion.
    Delete,
    /// Read query.
    Select,
}

impl DbOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 4] = [Self::Insert, Self::Update, Self::Delete, Self::Select];

    /// Returns the upper-case wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Select => "SELECT",
        }
    }
}

impl fmt::Display for DbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbOperation {
    type Err = MonitorError;

    /// Parses an operation name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MonitorError::UnknownEventType(s.to_string()))
    }
}

/// Outcome of a database operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DbStatus {
    /// Completed successfully.
    Success,
    /// Failed.
    Error,
    /// Still running.
    Pending,
}

impl DbStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 3] = [Self::Success, Self::Error, Self::Pending];
}

/// A database event before the store assigns its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewDatabaseEvent {
    /// Operation kind.
    #[serde(rename = "type")]
    pub kind: DbOperation,
    /// Table the operation touched.
    pub table: String,
    /// Acting user, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Number of rows affected.
    pub rows_affected: u32,
    /// Execution time in milliseconds.
    pub duration: f64,
    /// Outcome.
    pub status: DbStatus,
    /// Free-form extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// A logged database event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DatabaseEvent {
    /// Unique event identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RecordId,
    /// Operation kind.
    #[serde(rename = "type")]
    pub kind: DbOperation,
    /// Table the operation touched.
    pub table: String,
    /// Time the event was logged.
    pub timestamp: DateTime<Utc>,
    /// Acting user, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Number of rows affected.
    pub rows_affected: u32,
    /// Execution time in milliseconds.
    pub duration: f64,
    /// Outcome.
    pub status: DbStatus,
    /// Free-form extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

impl DatabaseEvent {
    /// Completes a [`NewDatabaseEvent`] with an identity and timestamp.
    #[must_use]
    pub fn from_new(id: RecordId, timestamp: DateTime<Utc>, event: NewDatabaseEvent) -> Self {
        Self {
            id,
            kind: event.kind,
            table: event.table,
            timestamp,
            user_id: event.user_id,
            rows_affected: event.rows_affected,
            duration: event.duration,
            status: event.status,
            metadata: event.metadata,
        }
    }
}
