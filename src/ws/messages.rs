//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server response to the request `id`.
    #[must_use]
    pub fn response(id: String, timestamp: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp,
            payload,
        }
    }

    /// Builds a server-pushed event with a fresh ID.
    #[must_use]
    pub fn event(timestamp: DateTime<Utc>, payload: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp,
            payload,
        }
    }

    /// Builds an error reply carrying `code` and `message`.
    #[must_use]
    pub fn error(id: String, timestamp: DateTime<Utc>, code: u16, message: &str) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp,
            payload: serde_json::json!({
                "code": code,
                "message": message,
            }),
        }
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, read from the
/// envelope's payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events on the given topics.
    Subscribe {
        /// Topic names. Use `["*"]` for all topics.
        topics: Vec<String>,
    },
    /// Unsubscribe from the given topics.
    Unsubscribe {
        /// Topic names. `"*"` drops every subscription.
        topics: Vec<String>,
    },
    /// Run one generation tick and recompute metrics.
    Refresh,
    /// Fetch the latest metrics snapshot.
    GetMetrics,
}
