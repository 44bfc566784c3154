//! Log stream DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `PUT /logs/stream`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogStreamRequest {
    /// `true` resumes the stream, `false` pauses it.
    pub active: bool,
}

/// Current state of the log stream.
#[derive(Debug, Serialize, ToSchema)]
pub struct LogStreamResponse {
    /// Whether new log entries are being produced.
    pub active: bool,
}
