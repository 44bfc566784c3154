//! Mock record generators.
//!
//! [`MockGenerator`] fabricates one record per call from an injectable
//! random source. With a seeded [`ChaCha8Rng`] and fixed timestamps the
//! output is fully reproducible. Values only have to be structurally valid
//! and within the documented ranges; they carry no meaning.

pub mod lorem;

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, Standard};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::{
    DbOperation, DbStatus, EmailEvent, EmailStatus, LogEntry, LogLevel, LogSource,
    NewDatabaseEvent, QueueMessage, QueueStatus, RecordId,
};

/// Tables database events are attributed to.
pub const TABLES: [&str; 4] = ["users", "orders", "products", "payments"];

/// Queues messages are observed on.
pub const QUEUES: [&str; 3] = ["email-queue", "notification-queue", "processing-queue"];

/// Exchange every generated message goes through.
pub const DEFAULT_EXCHANGE: &str = "default";

/// Sender address used when none is configured.
pub const DEFAULT_SENDER: &str = "noreply@trackingsystem.com";

/// Random record factory.
#[derive(Debug, Clone)]
pub struct MockGenerator<R = ChaCha8Rng> {
    rng: R,
    sender: String,
}

impl MockGenerator<ChaCha8Rng> {
    /// Creates a reproducible generator from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Creates a generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> MockGenerator<R> {
    /// Wraps an arbitrary random source.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            sender: DEFAULT_SENDER.to_string(),
        }
    }

    /// Overrides the `from` address of generated emails.
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Fabricates a database event; the store assigns its ID and timestamp.
    pub fn database_event(&mut self) -> NewDatabaseEvent {
        let rng = &mut self.rng;
        let centis: u32 = rng.gen_range(1_000..=100_000);
        NewDatabaseEvent {
            kind: rng.r#gen(),
            table: TABLES.choose(rng).copied().unwrap_or("users").to_string(),
            user_id: Some(RecordId::from_rng(rng).to_string()),
            rows_affected: rng.gen_range(1..=100),
            duration: f64::from(centis) / 100.0,
            status: rng.r#gen(),
            metadata: None,
        }
    }

    /// Fabricates a queue message observed at `now`.
    pub fn queue_message(&mut self, now: DateTime<Utc>) -> QueueMessage {
        let rng = &mut self.rng;
        let id = RecordId::from_rng(rng);
        let queue = QUEUES.choose(rng).copied().unwrap_or("email-queue");
        let routing_key = lorem::word(rng).to_string();
        let data = lorem::sentence(rng);
        QueueMessage {
            id,
            queue: queue.to_string(),
            exchange: DEFAULT_EXCHANGE.to_string(),
            routing_key,
            payload: serde_json::json!({ "data": data }),
            timestamp: now,
            status: rng.r#gen(),
            retry_count: rng.gen_range(0..=3),
            priority: rng.gen_range(1..=10),
        }
    }

    /// Fabricates an email tracking event recorded at `now`.
    pub fn email_event(&mut self, now: DateTime<Utc>) -> EmailEvent {
        let rng = &mut self.rng;
        let id = RecordId::from_rng(rng);
        let to = lorem::email_address(rng);
        let subject = lorem::sentence(rng);
        let status = rng.r#gen();
        let message_id = RecordId::from_rng(rng).to_string();
        EmailEvent {
            id,
            to,
            from: self.sender.clone(),
            subject,
            timestamp: now,
            status,
            message_id,
            template_id: None,
            opens: rng.gen_range(0..=10),
            clicks: rng.gen_range(0..=5),
        }
    }

    /// Fabricates a system log entry emitted at `now`.
    pub fn log_entry(&mut self, now: DateTime<Utc>) -> LogEntry {
        let rng = &mut self.rng;
        let id = RecordId::from_rng(rng);
        let source: LogSource = rng.r#gen();
        let level: LogLevel = rng.r#gen();
        let message = source
            .messages()
            .choose(rng)
            .copied()
            .unwrap_or("Service health check passed");
        LogEntry {
            id,
            timestamp: now,
            level,
            message: message.to_string(),
            source,
        }
    }

    /// Gives direct access to the random source.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

/// Picks uniformly from a non-empty variant list.
fn pick<T: Copy, R: Rng + ?Sized, const N: usize>(rng: &mut R, all: [T; N], fallback: T) -> T {
    all.choose(rng).copied().unwrap_or(fallback)
}

impl Distribution<DbOperation> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DbOperation {
        pick(rng, DbOperation::ALL, DbOperation::Select)
    }
}

impl Distribution<DbStatus> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DbStatus {
        pick(rng, DbStatus::ALL, DbStatus::Success)
    }
}

impl Distribution<QueueStatus> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QueueStatus {
        pick(rng, QueueStatus::ALL, QueueStatus::Pending)
    }
}

impl Distribution<EmailStatus> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EmailStatus {
        pick(rng, EmailStatus::ALL, EmailStatus::Sent)
    }
}

impl Distribution<LogLevel> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> LogLevel {
        pick(rng, LogLevel::ALL, LogLevel::Info)
    }
}

impl Distribution<LogSource> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> LogSource {
        pick(rng, LogSource::ALL, LogSource::System)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const SAMPLES: usize = 2_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or_default()
    }

    #[test]
    fn database_events_stay_in_range() {
        let mut generator = MockGenerator::seeded(1);
        let mut kinds = HashSet::new();
        let mut statuses = HashSet::new();
        for _ in 0..SAMPLES {
            let event = generator.database_event();
            assert!((1..=100).contains(&event.rows_affected));
            assert!((10.0..=1000.0).contains(&event.duration));
            let scaled = event.duration * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-6);
            assert!(TABLES.contains(&event.table.as_str()));
            assert!(event.user_id.is_some());
            kinds.insert(event.kind);
            statuses.insert(event.status);
        }
        assert_eq!(kinds.len(), DbOperation::ALL.len());
        assert_eq!(statuses.len(), DbStatus::ALL.len());
    }

    #[test]
    fn queue_messages_stay_in_range() {
        let mut generator = MockGenerator::seeded(2);
        for _ in 0..SAMPLES {
            let message = generator.queue_message(now());
            assert!(QUEUES.contains(&message.queue.as_str()));
            assert_eq!(message.exchange, DEFAULT_EXCHANGE);
            assert!(message.retry_count <= 3);
            assert!((1..=10).contains(&message.priority));
            assert!(message.payload.get("data").is_some_and(|v| v.is_string()));
            assert_eq!(message.timestamp, now());
        }
    }

    #[test]
    fn email_events_stay_in_range() {
        let mut generator = MockGenerator::seeded(3).with_sender("alerts@example.com");
        let mut ids = HashSet::new();
        for _ in 0..SAMPLES {
            let email = generator.email_event(now());
            assert!(email.opens <= 10);
            assert!(email.clicks <= 5);
            assert_eq!(email.from, "alerts@example.com");
            assert!(email.to.contains('@'));
            assert_ne!(email.id.to_string(), email.message_id);
            assert!(ids.insert(email.id));
        }
    }

    #[test]
    fn log_entries_use_source_catalog() {
        let mut generator = MockGenerator::seeded(4);
        for _ in 0..SAMPLES {
            let entry = generator.log_entry(now());
            assert!(entry.source.messages().contains(&entry.message.as_str()));
        }
    }

    #[test]
    fn same_seed_produces_identical_records() {
        let mut a = MockGenerator::seeded(42);
        let mut b = MockGenerator::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.database_event(), b.database_event());
            assert_eq!(a.queue_message(now()), b.queue_message(now()));
            assert_eq!(a.email_event(now()), b.email_event(now()));
            assert_eq!(a.log_entry(now()), b.log_entry(now()));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = MockGenerator::seeded(1);
        let mut b = MockGenerator::seeded(2);
        assert_ne!(a.email_event(now()), b.email_event(now()));
    }
}
