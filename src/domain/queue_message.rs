//! Message-queue records held in the queue [`super::RollingFeed`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RecordId;

/// Lowest message priority.
pub const MIN_PRIORITY: u8 = 1;

/// Highest message priority.
pub const MAX_PRIORITY: u8 = 10;

/// Processing state of a queue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    /// Waiting for a consumer.
    Pending,
    /// Picked up by a consumer.
    Processing,
    /// Acknowledged.
    Completed,
    /// Rejected or dead-lettered.
    Failed,
}

impl QueueStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Failed,
    ];
}

/// A message observed on a queue. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueueMessage {
    /// Unique message identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RecordId,
    /// Queue name.
    pub queue: String,
    /// Exchange the message was published through.
    pub exchange: String,
    /// Routing key used for delivery.
    pub routing_key: String,
    /// Opaque message body.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Time the message was observed.
    pub timestamp: DateTime<Utc>,
    /// Processing state.
    pub status: QueueStatus,
    /// Number of delivery retries so far.
    pub retry_count: u32,
    /// Priority in `MIN_PRIORITY..=MAX_PRIORITY`.
    pub priority: u8,
}

impl QueueMessage {
    /// Returns `true` if the message is still waiting for a consumer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == QueueStatus::Pending
    }
}

/// Clamps a requested priority into the valid range.
#[must_use]
pub fn clamp_priority(priority: u8) -> u8 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_priority_bounds() {
        assert_eq!(clamp_priority(0), MIN_PRIORITY);
        assert_eq!(clamp_priority(5), 5);
        assert_eq!(clamp_priority(42), MAX_PRIORITY);
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&QueueStatus::Processing).unwrap_or_default();
        assert_eq!(json, "\"PROCESSING\"");
    }
}
