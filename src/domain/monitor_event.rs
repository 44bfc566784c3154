//! Change notifications emitted by the monitor.
//!
//! Every mutation publishes a [`MonitorEvent`] through the
//! [`super::EventBus`]; WebSocket connections forward the ones whose
//! [`Topic`] the client subscribed to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DatabaseEvent, EmailEvent, LogEntry, QueueMessage, SystemMetrics};

/// Subscription channel a [`MonitorEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Database events.
    Database,
    /// Queue messages.
    Queue,
    /// Email tracking events.
    Email,
    /// Metrics snapshots.
    Metrics,
    /// System log entries.
    Logs,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Database,
        Self::Queue,
        Self::Email,
        Self::Metrics,
        Self::Logs,
    ];

    /// Returns the topic name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Queue => "queue",
            Self::Email => "email",
            Self::Metrics => "metrics",
            Self::Logs => "logs",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {s}"))
    }
}

/// Notification emitted after every state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A database event was appended to the store.
    DatabaseEventLogged {
        /// The stored event.
        event: DatabaseEvent,
    },

    /// A queue message entered the queue feed.
    QueueMessageReceived {
        /// The message.
        message: QueueMessage,
    },

    /// An email event entered the email feed.
    EmailEventTracked {
        /// The email event.
        event: EmailEvent,
    },

    /// The metrics snapshot was recomputed.
    MetricsUpdated {
        /// The new snapshot.
        metrics: SystemMetrics,
    },

    /// A system log entry was emitted.
    LogEmitted {
        /// The log entry.
        entry: LogEntry,
    },
}

impl MonitorEvent {
    /// Returns the topic this event is delivered on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::DatabaseEventLogged { .. } => Topic::Database,
            Self::QueueMessageReceived { .. } => Topic::Queue,
            Self::EmailEventTracked { .. } => Topic::Email,
            Self::MetricsUpdated { .. } => Topic::Metrics,
            Self::LogEmitted { .. } => Topic::Logs,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::DatabaseEventLogged { .. } => "database_event_logged",
            Self::QueueMessageReceived { .. } => "queue_message_received",
            Self::EmailEventTracked { .. } => "email_event_tracked",
            Self::MetricsUpdated { .. } => "metrics_updated",
            Self::LogEmitted { .. } => "log_emitted",
        }
    }
}
