//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` provides bidirectional communication
//! for topic subscriptions and dashboard commands.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
