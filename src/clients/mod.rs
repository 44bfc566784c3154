//! Clients for the external services the dashboard tracks.
//!
//! Both are simulations: the monitor never talks to a real broker or email
//! API. They sit behind traits so the service only depends on the
//! operations, and they are best-effort from the service's point of view.

pub mod broker;
pub mod email_provider;

pub use broker::{MessageBroker, PublishOptions, QueueConsumer, QueueInfo, SimulatedBroker};
pub use email_provider::{DeliveryStats, EmailProvider, SimulatedEmailProvider};
