//! REST endpoint handlers organized by resource.

pub mod dashboard;
pub mod email;
pub mod events;
pub mod logs;
pub mod queue;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(dashboard::routes())
        .merge(events::routes())
        .merge(queue::routes())
        .merge(email::routes())
        .merge(logs::routes())
}
