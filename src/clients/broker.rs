//! Message-broker client and its in-memory simulation.
//!
//! [`SimulatedBroker`] keeps one broadcast channel per queue. Publishing
//! builds a `PENDING` [`QueueMessage`] and hands it to every live
//! [`QueueConsumer`] of that queue. Nothing leaves the process.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::clock::Clock;
use crate::domain::queue_message::clamp_priority;
use crate::domain::{QueueMessage, QueueStatus, RecordId};
use crate::error::MonitorError;
use crate::generator::DEFAULT_EXCHANGE;

/// Per-queue buffer for consumers that fall behind.
const CONSUMER_BUFFER: usize = 256;

/// Optional publish parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublishOptions {
    /// Message priority, clamped into 1..=10. Defaults to the lowest.
    #[serde(default)]
    pub priority: Option<u8>,
    /// Exchange name. Defaults to `default`.
    #[serde(default)]
    pub exchange: Option<String>,
    /// Routing key. Defaults to the queue name.
    #[serde(default)]
    pub routing_key: Option<String>,
}

/// Broker-side view of a queue.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QueueInfo {
    /// Queue name.
    pub name: String,
    /// Messages published to the queue since the broker started.
    pub messages: u64,
    /// Live consumers.
    pub consumers: usize,
    /// Published messages per second since the broker connected.
    pub message_rate: f64,
}

/// Message-broker operations the monitor relies on.
pub trait MessageBroker: Debug + Send + Sync {
    /// Opens the broker connection.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::BrokerUnavailable`] if the broker cannot be
    /// reached.
    fn connect(&self) -> Result<(), MonitorError>;

    /// Closes the broker connection. Idempotent.
    fn disconnect(&self);

    /// Returns `true` while connected.
    fn is_connected(&self) -> bool;

    /// Publishes `payload` to `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::BrokerUnavailable`] when not connected.
    fn publish(
        &self,
        queue: &str,
        payload: serde_json::Value,
        options: PublishOptions,
    ) -> Result<QueueMessage, MonitorError>;

    /// Starts consuming messages published to `queue` from now on.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::BrokerUnavailable`] when not connected.
    fn consume(&self, queue: &str) -> Result<QueueConsumer, MonitorError>;

    /// Reports counters for `queue`.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::BrokerUnavailable`] when not connected.
    fn queue_info(&self, queue: &str) -> Result<QueueInfo, MonitorError>;
}

/// Receiving end of a queue subscription.
#[derive(Debug)]
pub struct QueueConsumer {
    queue: String,
    receiver: broadcast::Receiver<QueueMessage>,
}

impl QueueConsumer {
    /// Queue this consumer reads from.
    #[must_use]
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Waits for the next message. Returns `None` once the broker is gone.
    ///
    /// Messages missed while lagging are skipped with a warning.
    pub async fn next(&mut self) -> Option<QueueMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(queue = %self.queue, skipped = n, "queue consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Debug)]
struct QueueChannel {
    sender: broadcast::Sender<QueueMessage>,
    published: u64,
}

impl QueueChannel {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(CONSUMER_BUFFER);
        Self {
            sender,
            published: 0,
        }
    }
}

/// In-process stand-in for a message broker.
#[derive(Debug)]
pub struct SimulatedBroker {
    url: String,
    connected: AtomicBool,
    connected_at: Mutex<Option<DateTime<Utc>>>,
    queues: Mutex<HashMap<String, QueueChannel>>,
    clock: Arc<dyn Clock>,
}

impl SimulatedBroker {
    /// Creates a disconnected broker that pretends to live at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            url: url.into(),
            connected: AtomicBool::new(false),
            connected_at: Mutex::new(None),
            queues: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Address reported in logs.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn ensure_connected(&self) -> Result<(), MonitorError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(MonitorError::BrokerUnavailable(format!(
                "not connected to {}",
                self.url
            )))
        }
    }

    fn with_queue<T>(
        &self,
        queue: &str,
        f: impl FnOnce(&mut QueueChannel) -> T,
    ) -> Result<T, MonitorError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| MonitorError::Internal("broker queue table poisoned".to_string()))?;
        let channel = queues
            .entry(queue.to_string())
            .or_insert_with(QueueChannel::new);
        Ok(f(channel))
    }

    fn uptime_secs(&self) -> f64 {
        let since = self
            .connected_at
            .lock()
            .ok()
            .and_then(|guard| *guard)
            .unwrap_or_else(|| self.clock.now());
        let elapsed = (self.clock.now() - since).num_milliseconds() as f64 / 1_000.0;
        elapsed.max(1.0)
    }
}

impl MessageBroker for SimulatedBroker {
    fn connect(&self) -> Result<(), MonitorError> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            if let Ok(mut at) = self.connected_at.lock() {
                *at = Some(self.clock.now());
            }
            tracing::info!(url = self.url(), "connected to message queue simulation");
        }
        Ok(())
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            tracing::info!(url = %self.url, "disconnected from message queue simulation");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(
        &self,
        queue: &str,
        payload: serde_json::Value,
        options: PublishOptions,
    ) -> Result<QueueMessage, MonitorError> {
        self.ensure_connected()?;

        let message = QueueMessage {
            id: RecordId::new(),
            queue: queue.to_string(),
            exchange: options
                .exchange
                .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string()),
            routing_key: options.routing_key.unwrap_or_else(|| queue.to_string()),
            payload,
            timestamp: self.clock.now(),
            status: QueueStatus::Pending,
            retry_count: 0,
            priority: clamp_priority(options.priority.unwrap_or(0)),
        };

        let delivered = self.with_queue(queue, |channel| {
            channel.published = channel.published.saturating_add(1);
            channel.sender.send(message.clone()).unwrap_or(0)
        })?;

        tracing::debug!(queue, id = %message.id, consumers = delivered, "message published");
        Ok(message)
    }

    fn consume(&self, queue: &str) -> Result<QueueConsumer, MonitorError> {
        self.ensure_connected()?;
        let receiver = self.with_queue(queue, |channel| channel.sender.subscribe())?;
        tracing::debug!(queue, "consumer attached");
        Ok(QueueConsumer {
            queue: queue.to_string(),
            receiver,
        })
    }

    fn queue_info(&self, queue: &str) -> Result<QueueInfo, MonitorError> {
        self.ensure_connected()?;
        let (messages, consumers) = self.with_queue(queue, |channel| {
            (channel.published, channel.sender.receiver_count())
        })?;
        Ok(QueueInfo {
            name: queue.to_string(),
            messages,
            consumers,
            message_rate: messages as f64 / self.uptime_secs(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    fn connected_broker() -> (SimulatedBroker, ManualClock) {
        let clock = ManualClock::default();
        let broker = SimulatedBroker::new("ws://localhost:8080", Arc::new(clock.clone()));
        tokio_test::assert_ok!(broker.connect());
        (broker, clock)
    }

    #[test]
    fn publish_requires_connection() {
        let broker = SimulatedBroker::new("ws://localhost:8080", Arc::new(ManualClock::default()));
        let result = broker.publish("email-queue", serde_json::json!({}), PublishOptions::default());
        assert!(matches!(result, Err(MonitorError::BrokerUnavailable(_))));
    }

    #[test]
    fn publish_applies_defaults() {
        let (broker, _) = connected_broker();
        let Ok(message) = broker.publish(
            "email-queue",
            serde_json::json!({ "to": "ada@example.com" }),
            PublishOptions::default(),
        ) else {
            panic!("publish failed");
        };
        assert_eq!(message.status, QueueStatus::Pending);
        assert_eq!(message.exchange, "default");
        assert_eq!(message.routing_key, "email-queue");
        assert_eq!(message.retry_count, 0);
        assert_eq!(message.priority, 1);
    }

    #[test]
    fn publish_honours_options() {
        let (broker, _) = connected_broker();
        let options = PublishOptions {
            priority: Some(99),
            exchange: Some("events".to_string()),
            routing_key: Some("user.created".to_string()),
        };
        let Ok(message) = broker.publish("notification-queue", serde_json::json!(1), options) else {
            panic!("publish failed");
        };
        assert_eq!(message.priority, 10);
        assert_eq!(message.exchange, "events");
        assert_eq!(message.routing_key, "user.created");
    }

    #[tokio::test]
    async fn consumer_receives_only_its_queue() {
        let (broker, _) = connected_broker();
        let Ok(mut consumer) = broker.consume("processing-queue") else {
            panic!("consume failed");
        };

        let _ = broker.publish("email-queue", serde_json::json!("other"), PublishOptions::default());
        let _ = broker.publish(
            "processing-queue",
            serde_json::json!("mine"),
            PublishOptions::default(),
        );

        let Some(message) = consumer.next().await else {
            panic!("expected message");
        };
        assert_eq!(consumer.queue(), "processing-queue");
        assert_eq!(message.payload, serde_json::json!("mine"));
    }

    #[test]
    fn queue_info_counts_messages_and_consumers() {
        let (broker, clock) = connected_broker();
        let _consumer = broker.consume("email-queue");
        for _ in 0..4 {
            let _ = broker.publish("email-queue", serde_json::json!({}), PublishOptions::default());
        }
        clock.advance(Duration::seconds(2));

        let Ok(info) = broker.queue_info("email-queue") else {
            panic!("queue_info failed");
        };
        assert_eq!(info.name, "email-queue");
        assert_eq!(info.messages, 4);
        assert_eq!(info.consumers, 1);
        assert!((info.message_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (broker, _) = connected_broker();
        broker.disconnect();
        broker.disconnect();
        assert!(!broker.is_connected());
        assert!(broker.queue_info("email-queue").is_err());
        assert_eq!(broker.url(), "ws://localhost:8080");
    }
}
