//! # tracking-monitor
//!
//! Mock event feed and rolling metrics service for a database, message
//! queue and email monitoring dashboard.
//!
//! Nothing here talks to a real database, broker or email API. Generators
//! fabricate records on a timer, bounded feeds keep the most recent ones,
//! and an aggregator turns the collections into a [`domain::SystemMetrics`]
//! snapshot. The data is served over REST and pushed over WebSocket so any
//! dashboard front-end can render it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── MonitorService (service/) ◄── Scheduler (scheduler.rs)
//!     ├── EventBus (domain/)
//!     │
//!     ├── EventStore · RollingFeed · aggregate (domain/)
//!     ├── MockGenerator (generator/)
//!     │
//!     └── SimulatedBroker · SimulatedEmailProvider (clients/)
//! ```

pub mod api;
pub mod app_state;
pub mod clients;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod generator;
pub mod scheduler;
pub mod service;
pub mod ws;
