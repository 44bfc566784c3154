//! Queue publish DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::clients::PublishOptions;
use crate::domain::QueueMessage;

/// Request body for `POST /queues/{queue}/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Opaque message payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Priority, clamped into 1–10. Defaults to 1.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Exchange name. Defaults to `default`.
    #[serde(default)]
    pub exchange: Option<String>,
    /// Routing key. Defaults to the queue name.
    #[serde(default)]
    pub routing_key: Option<String>,
}

impl PublishRequest {
    /// Splits the request into payload and broker options.
    #[must_use]
    pub fn into_parts(self) -> (serde_json::Value, PublishOptions) {
        let options = PublishOptions {
            priority: self.priority,
            exchange: self.exchange,
            routing_key: self.routing_key,
        };
        (self.payload, options)
    }
}

/// Response body for `POST /queues/{queue}/messages`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Always `true`; refused publishes return an error instead.
    pub accepted: bool,
    /// The message as recorded in the queue feed.
    pub message: QueueMessage,
}
