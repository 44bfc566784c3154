//! Domain layer: monitored records, the event store, rolling feeds,
//! metrics aggregation and the event system.

pub mod database_event;
pub mod email_event;
pub mod event_bus;
pub mod event_store;
pub mod log_entry;
pub mod metrics;
pub mod monitor_event;
pub mod queue_message;
pub mod record_id;
pub mod rolling_feed;

pub use database_event::{DatabaseEvent, DbOperation, DbStatus, NewDatabaseEvent};
pub use email_event::{EmailEvent, EmailStatus};
pub use event_bus::EventBus;
pub use event_store::{DEFAULT_EVENT_LIMIT, EventStore, StoreMetrics};
pub use log_entry::{LogEntry, LogLevel, LogSource};
pub use metrics::{EmailStats, QueueStats, SystemMetrics, aggregate};
pub use monitor_event::{MonitorEvent, Topic};
pub use queue_message::{QueueMessage, QueueStatus};
pub use record_id::RecordId;
pub use rolling_feed::{DEFAULT_FEED_CAPACITY, MAX_FEED_CAPACITY, RollingFeed};
