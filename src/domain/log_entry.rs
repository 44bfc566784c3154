//! System log lines shown in the live activity stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RecordId;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Informational.
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
    /// Successful completion.
    Success,
}

impl LogLevel {
    /// Every level, in declaration order.
    pub const ALL: [Self; 4] = [Self::Info, Self::Warn, Self::Error, Self::Success];
}

/// Subsystem that emitted a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogSource {
    /// Database layer.
    Database,
    /// Message queue.
    Queue,
    /// Email delivery.
    Email,
    /// The monitor itself.
    System,
}

impl LogSource {
    /// Every source, in declaration order.
    pub const ALL: [Self; 4] = [Self::Database, Self::Queue, Self::Email, Self::System];

    /// Canned messages this source emits.
    #[must_use]
    pub const fn messages(&self) -> &'static [&'static str] {
        match self {
            Self::Database => &[
                "New connection established",
                "Query executed successfully",
                "Transaction committed",
                "Index optimization completed",
                "Backup process started",
            ],
            Self::Queue => &[
                "Message published to queue",
                "Consumer connected",
                "Queue depth threshold reached",
                "Dead letter queue processed",
                "Message acknowledgment received",
            ],
            Self::Email => &[
                "Email delivery confirmed",
                "Template rendered successfully",
                "Bounce notification received",
                "Unsubscribe request processed",
                "Campaign analytics updated",
            ],
            Self::System => &[
                "Service health check passed",
                "Memory usage optimized",
                "API rate limit applied",
                "Configuration updated",
                "Monitoring alert triggered",
            ],
        }
    }
}

/// One line of the system activity stream. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    /// Unique entry identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RecordId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Emitting subsystem.
    pub source: LogSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_has_five_messages() {
        for source in LogSource::ALL {
            assert_eq!(source.messages().len(), 5);
        }
    }
}
