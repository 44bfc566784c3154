//! Monitor service: owns the monitored collections and emits events.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use crate::clients::{
    DeliveryStats, EmailProvider, MessageBroker, PublishOptions, QueueInfo, SimulatedBroker,
    SimulatedEmailProvider,
};
use crate::clock::Clock;
use crate::domain::{
    DEFAULT_EVENT_LIMIT, DEFAULT_FEED_CAPACITY, DatabaseEvent, DbOperation, EmailEvent,
    EmailStats, EventBus, EventStore, LogEntry, MonitorEvent, QueueMessage, QueueStats,
    RollingFeed, StoreMetrics, SystemMetrics, aggregate,
};
use crate::error::MonitorError;
use crate::generator::{DEFAULT_SENDER, MockGenerator};

/// Address the default simulated broker reports.
pub const DEFAULT_BROKER_URL: &str = "ws://localhost:8080";

/// Sizing knobs for a [`MonitorService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Capacity of each rolling feed.
    pub feed_capacity: usize,
    /// Events returned when a caller does not pass a limit.
    pub events_default_limit: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            feed_capacity: DEFAULT_FEED_CAPACITY,
            events_default_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

/// Records fabricated by one generation tick.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedBatch {
    /// Event appended to the store.
    pub database_event: DatabaseEvent,
    /// Message pushed onto the queue feed.
    pub queue_message: QueueMessage,
    /// Event pushed onto the email feed.
    pub email_event: EmailEvent,
}

/// Everything the dashboard renders, captured under one lock.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    /// Database events as of the last load.
    pub database_events: Vec<DatabaseEvent>,
    /// Queue feed, newest first.
    pub queue_messages: Vec<QueueMessage>,
    /// Email feed, newest first.
    pub email_events: Vec<EmailEvent>,
    /// Latest metrics snapshot.
    pub metrics: SystemMetrics,
}

#[derive(Debug)]
struct MonitorState {
    store: EventStore,
    queue_feed: RollingFeed<QueueMessage>,
    email_feed: RollingFeed<EmailEvent>,
    log_feed: RollingFeed<LogEntry>,
    metrics: SystemMetrics,
    displayed_events: Vec<DatabaseEvent>,
    emails_tracked: u64,
    log_stream_active: bool,
}

impl MonitorState {
    fn track_email(&mut self, email: EmailEvent) {
        self.email_feed.push(email);
        self.emails_tracked = self.emails_tracked.saturating_add(1);
    }
}

/// Orchestration layer for the monitored collections.
///
/// Owns the [`EventStore`], the queue, email and log feeds, the latest
/// [`SystemMetrics`] and the generator. Every mutation follows the pattern:
/// fabricate or fetch the record → take the state lock → mutate → release
/// → emit events. Broker and email-provider failures are logged and turn
/// the operation into a no-op.
#[derive(Debug)]
pub struct MonitorService {
    state: RwLock<MonitorState>,
    generator: Mutex<MockGenerator>,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    broker: Arc<dyn MessageBroker>,
    email_provider: Arc<dyn EmailProvider>,
    events_default_limit: usize,
}

impl MonitorService {
    /// Creates a service with a connected [`SimulatedBroker`] and an enabled
    /// [`SimulatedEmailProvider`], both seeded from `generator`.
    #[must_use]
    pub fn new(
        mut generator: MockGenerator,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        settings: MonitorSettings,
    ) -> Self {
        let broker = SimulatedBroker::new(DEFAULT_BROKER_URL, Arc::clone(&clock));
        if let Err(err) = broker.connect() {
            tracing::warn!(%err, "simulated broker failed to connect");
        }
        let provider_seed: u64 = generator.rng_mut().r#gen();
        let email_provider = SimulatedEmailProvider::new(
            None,
            DEFAULT_SENDER,
            ChaCha8Rng::seed_from_u64(provider_seed),
            Arc::clone(&clock),
        );

        Self::with_clients(
            generator,
            clock,
            event_bus,
            settings,
            Arc::new(broker),
            Arc::new(email_provider),
        )
    }

    /// Creates a service around already configured clients.
    #[must_use]
    pub fn with_clients(
        generator: MockGenerator,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
        settings: MonitorSettings,
        broker: Arc<dyn MessageBroker>,
        email_provider: Arc<dyn EmailProvider>,
    ) -> Self {
        let state = MonitorState {
            store: EventStore::new(Arc::clone(&clock)),
            queue_feed: RollingFeed::new(settings.feed_capacity),
            email_feed: RollingFeed::new(settings.feed_capacity),
            log_feed: RollingFeed::new(settings.feed_capacity),
            metrics: SystemMetrics::default(),
            displayed_events: Vec::new(),
            emails_tracked: 0,
            log_stream_active: true,
        };

        Self {
            state: RwLock::new(state),
            generator: Mutex::new(generator),
            clock,
            event_bus,
            broker,
            email_provider,
            events_default_limit: settings.events_default_limit,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the message broker.
    #[must_use]
    pub fn broker(&self) -> &Arc<dyn MessageBroker> {
        &self.broker
    }

    /// Returns the clock stamping new records.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // ── Generation and aggregation ─────────────────────────────────────

    /// Fabricates one database event, one queue message and one email
    /// event and appends them to their collections.
    pub async fn generate_tick(&self) -> GeneratedBatch {
        let now = self.clock.now();
        let (new_event, queue_message, email_event) = {
            let mut generator = self.generator.lock().await;
            (
                generator.database_event(),
                generator.queue_message(now),
                generator.email_event(now),
            )
        };

        let database_event = {
            let mut state = self.state.write().await;
            let stored = state.store.log_event(new_event);
            state.queue_feed.push(queue_message.clone());
            state.track_email(email_event.clone());
            stored
        };

        let _ = self.event_bus.publish(MonitorEvent::DatabaseEventLogged {
            event: database_event.clone(),
        });
        let _ = self.event_bus.publish(MonitorEvent::QueueMessageReceived {
            message: queue_message.clone(),
        });
        let _ = self.event_bus.publish(MonitorEvent::EmailEventTracked {
            event: email_event.clone(),
        });

        tracing::debug!(
            db_event = %database_event.id,
            queue = %queue_message.queue,
            email_status = ?email_event.status,
            "mock records generated"
        );

        GeneratedBatch {
            database_event,
            queue_message,
            email_event,
        }
    }

    /// Manual refresh: one generation tick followed by a metrics
    /// recomputation.
    pub async fn refresh(&self) -> GeneratedBatch {
        let batch = self.generate_tick().await;
        self.recompute_metrics().await;
        tracing::info!("manual refresh");
        batch
    }

    /// Recomputes the metrics snapshot from the current collections.
    ///
    /// When the number of stored events changed since the previous
    /// snapshot, the displayed event list is reloaded as well.
    pub async fn recompute_metrics(&self) -> SystemMetrics {
        let metrics = {
            let mut state = self.state.write().await;
            let metrics = aggregate(
                &state.store.get_metrics(),
                &state.queue_feed,
                &state.email_feed,
            );
            if metrics.total_events != state.metrics.total_events {
                state.displayed_events = state.store.get_events(self.events_default_limit);
            }
            state.metrics = metrics;
            metrics
        };

        let _ = self
            .event_bus
            .publish(MonitorEvent::MetricsUpdated { metrics });
        metrics
    }

    /// Fills the displayed event list from the store. Returns its length.
    pub async fn load_initial(&self) -> usize {
        let mut state = self.state.write().await;
        state.displayed_events = state.store.get_events(self.events_default_limit);
        let loaded = state.displayed_events.len();
        tracing::info!(loaded, "initial database events loaded");
        loaded
    }

    /// Appends one system log entry unless the stream is paused.
    ///
    /// The pause flag is checked under the same write guard that pushes the
    /// entry, so no entry lands after a pause has been acknowledged.
    pub async fn emit_log_entry(&self) -> Option<LogEntry> {
        let entry = {
            let mut state = self.state.write().await;
            if !state.log_stream_active {
                return None;
            }
            let entry = self.generator.lock().await.log_entry(self.clock.now());
            state.log_feed.push(entry.clone());
            entry
        };

        let _ = self.event_bus.publish(MonitorEvent::LogEmitted {
            entry: entry.clone(),
        });
        Some(entry)
    }

    /// Pauses (`false`) or resumes (`true`) the system log stream.
    pub async fn set_log_stream_active(&self, active: bool) {
        self.state.write().await.log_stream_active = active;
        tracing::info!(active, "log stream toggled");
    }

    /// Returns `true` while the log stream is running.
    pub async fn log_stream_active(&self) -> bool {
        self.state.read().await.log_stream_active
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// Most recent stored events, newest first.
    pub async fn database_events(&self, limit: Option<usize>) -> Vec<DatabaseEvent> {
        let limit = limit.unwrap_or(self.events_default_limit);
        self.state.read().await.store.get_events(limit)
    }

    /// Events on `table`, in insertion order.
    pub async fn events_by_table(&self, table: &str) -> Vec<DatabaseEvent> {
        self.state.read().await.store.get_events_by_table(table)
    }

    /// Events of operation `kind`, in insertion order.
    pub async fn events_by_type(&self, kind: DbOperation) -> Vec<DatabaseEvent> {
        self.state.read().await.store.get_events_by_type(kind)
    }

    /// Metrics over the whole event log.
    pub async fn store_metrics(&self) -> StoreMetrics {
        self.state.read().await.store.get_metrics()
    }

    /// Newest queue messages; the whole feed when `limit` is `None`.
    pub async fn queue_messages(&self, limit: Option<usize>) -> Vec<QueueMessage> {
        let state = self.state.read().await;
        state.queue_feed.latest(limit.unwrap_or(state.queue_feed.len()))
    }

    /// Newest email events; the whole feed when `limit` is `None`.
    pub async fn email_events(&self, limit: Option<usize>) -> Vec<EmailEvent> {
        let state = self.state.read().await;
        state.email_feed.latest(limit.unwrap_or(state.email_feed.len()))
    }

    /// Newest log entries; the whole feed when `limit` is `None`.
    pub async fn log_entries(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let state = self.state.read().await;
        state.log_feed.latest(limit.unwrap_or(state.log_feed.len()))
    }

    /// Latest metrics snapshot (not recomputed).
    pub async fn metrics(&self) -> SystemMetrics {
        self.state.read().await.metrics
    }

    /// Per-queue and per-status counts over the queue feed.
    pub async fn queue_stats(&self) -> QueueStats {
        QueueStats::from_feed(&self.state.read().await.queue_feed)
    }

    /// Delivery breakdown over the email feed.
    pub async fn email_stats(&self) -> EmailStats {
        let state = self.state.read().await;
        EmailStats::from_feed(&state.email_feed, state.emails_tracked)
    }

    /// Captures everything the dashboard renders.
    pub async fn dashboard(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            database_events: state.displayed_events.clone(),
            queue_messages: state.queue_feed.to_vec(),
            email_events: state.email_feed.to_vec(),
            metrics: state.metrics,
        }
    }

    // ── Best-effort client operations ──────────────────────────────────

    /// Publishes through the broker and records the message in the queue
    /// feed. Returns `None` if the broker refused.
    pub async fn publish_message(
        &self,
        queue: &str,
        payload: serde_json::Value,
        options: PublishOptions,
    ) -> Option<QueueMessage> {
        let message = match self.broker.publish(queue, payload, options) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(queue, %err, "failed to publish message");
                return None;
            }
        };

        self.state.write().await.queue_feed.push(message.clone());
        let _ = self.event_bus.publish(MonitorEvent::QueueMessageReceived {
            message: message.clone(),
        });
        tracing::info!(queue, id = %message.id, "message published to queue");
        Some(message)
    }

    /// Broker counters for `queue`, or `None` if the broker is unavailable.
    #[must_use]
    pub fn queue_info(&self, queue: &str) -> Option<QueueInfo> {
        self.broker
            .queue_info(queue)
            .inspect_err(|err| tracing::warn!(queue, %err, "failed to fetch queue info"))
            .ok()
    }

    /// Sends through the email provider and records the result in the
    /// email feed. Returns `None` if the provider refused.
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        content: &str,
        template_id: Option<&str>,
    ) -> Option<EmailEvent> {
        let email = match self
            .email_provider
            .send_email(to, subject, content, template_id)
        {
            Ok(email) => email,
            Err(err) => {
                tracing::warn!(%err, "failed to send email");
                return None;
            }
        };

        self.state.write().await.track_email(email.clone());
        let _ = self.event_bus.publish(MonitorEvent::EmailEventTracked {
            event: email.clone(),
        });
        Some(email)
    }

    /// Provider engagement counters for `message_id`.
    ///
    /// # Errors
    ///
    /// Passes through [`MonitorError::EmailNotFound`] for unknown messages
    /// and [`MonitorError::EmailProviderUnavailable`] during an outage.
    pub fn email_delivery_stats(&self, message_id: &str) -> Result<DeliveryStats, MonitorError> {
        self.email_provider
            .email_stats(message_id)
            .inspect_err(|err| tracing::warn!(message_id, %err, "failed to get email stats"))
    }

    /// Forwards a webhook-style engagement event to the email provider.
    pub fn track_email_event(&self, message_id: &str, event: &str) {
        self.email_provider.track_email_event(message_id, event);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::{QueueStatus, Topic};
    use chrono::Duration;

    fn make_service() -> (MonitorService, ManualClock) {
        let clock = ManualClock::default();
        let service = MonitorService::new(
            MockGenerator::seeded(5),
            Arc::new(clock.clone()),
            EventBus::new(1000),
            MonitorSettings::default(),
        );
        (service, clock)
    }

    #[tokio::test]
    async fn generate_tick_appends_to_every_collection() {
        let (service, _) = make_service();
        let batch = service.generate_tick().await;

        assert_eq!(service.store_metrics().await.total_events, 1);
        let queue = service.queue_messages(None).await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.first().map(|m| m.id), Some(batch.queue_message.id));
        assert_eq!(service.email_events(None).await.len(), 1);
    }

    #[tokio::test]
    async fn generate_tick_emits_three_events() {
        let (service, _) = make_service();
        let mut rx = service.event_bus().subscribe();
        service.generate_tick().await;

        let mut topics = Vec::new();
        for _ in 0..3 {
            let Ok(event) = rx.recv().await else {
                panic!("expected event");
            };
            topics.push(event.topic());
        }
        assert_eq!(topics, vec![Topic::Database, Topic::Queue, Topic::Email]);
    }

    #[tokio::test]
    async fn metrics_are_stale_until_recomputed() {
        let (service, _) = make_service();
        service.generate_tick().await;
        assert_eq!(service.metrics().await.total_events, 0);

        let metrics = service.recompute_metrics().await;
        assert_eq!(metrics.total_events, 1);
        assert_eq!(metrics.emails_sent, 1);
        assert_eq!(service.metrics().await, metrics);
    }

    #[tokio::test]
    async fn refresh_generates_and_recomputes() {
        let (service, _) = make_service();
        service.refresh().await;
        service.refresh().await;
        let metrics = service.metrics().await;
        assert_eq!(metrics.total_events, 2);
        assert_eq!(service.dashboard().await.database_events.len(), 2);
    }

    #[tokio::test]
    async fn feeds_cap_while_store_grows() {
        let (service, clock) = make_service();
        for _ in 0..60 {
            clock.advance(Duration::milliseconds(3_000));
            service.generate_tick().await;
        }
        let metrics = service.recompute_metrics().await;
        assert_eq!(metrics.total_events, 60);
        assert_eq!(metrics.emails_sent, 50);
        assert_eq!(service.queue_messages(None).await.len(), 50);
        assert_eq!(service.email_stats().await.total_tracked, 60);

        let pending = service
            .queue_messages(None)
            .await
            .iter()
            .filter(|m| m.status == QueueStatus::Pending)
            .count();
        assert_eq!(metrics.queue_depth, pending);
    }

    #[tokio::test]
    async fn displayed_events_reload_only_when_total_changes() {
        let (service, _) = make_service();
        assert_eq!(service.load_initial().await, 0);

        service.generate_tick().await;
        assert!(service.dashboard().await.database_events.is_empty());

        service.recompute_metrics().await;
        assert_eq!(service.dashboard().await.database_events.len(), 1);
    }

    #[tokio::test]
    async fn paused_log_stream_emits_nothing() {
        let (service, _) = make_service();
        assert!(service.emit_log_entry().await.is_some());

        service.set_log_stream_active(false).await;
        assert!(service.emit_log_entry().await.is_none());
        assert_eq!(service.log_entries(None).await.len(), 1);

        service.set_log_stream_active(true).await;
        assert!(service.emit_log_entry().await.is_some());
        assert_eq!(service.log_entries(Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn publish_with_disconnected_broker_is_a_no_op() {
        let (service, _) = make_service();
        service.broker().disconnect();

        let published = service
            .publish_message("email-queue", serde_json::json!({}), PublishOptions::default())
            .await;
        assert!(published.is_none());
        assert!(service.queue_messages(None).await.is_empty());
        assert!(service.queue_info("email-queue").is_none());
    }

    #[tokio::test]
    async fn publish_records_pending_message() {
        let (service, _) = make_service();
        let Some(message) = service
            .publish_message("email-queue", serde_json::json!({"n": 1}), PublishOptions::default())
            .await
        else {
            panic!("publish failed");
        };
        assert_eq!(message.status, QueueStatus::Pending);
        assert_eq!(service.recompute_metrics().await.queue_depth, 1);
        assert_eq!(service.queue_info("email-queue").map(|i| i.messages), Some(1));
    }

    #[tokio::test]
    async fn send_email_tracks_event_and_stats() {
        let (service, _) = make_service();
        let Some(email) = service
            .send_email("ada@example.com", "Welcome", "Hello", Some("welcome-v1"))
            .await
        else {
            panic!("send failed");
        };
        assert_eq!(service.email_events(None).await.len(), 1);
        assert!(service.email_delivery_stats(&email.message_id).is_ok());
        assert!(matches!(
            service.email_delivery_stats("msg_missing"),
            Err(MonitorError::EmailNotFound(_))
        ));
        service.track_email_event(&email.message_id, "open");
    }

    fn service_with_provider() -> (MonitorService, Arc<SimulatedEmailProvider>) {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let broker = SimulatedBroker::new(DEFAULT_BROKER_URL, Arc::clone(&clock));
        let provider = Arc::new(SimulatedEmailProvider::new(
            Some("test-key".to_string()),
            DEFAULT_SENDER,
            ChaCha8Rng::seed_from_u64(21),
            Arc::clone(&clock),
        ));
        let service = MonitorService::with_clients(
            MockGenerator::seeded(5),
            clock,
            EventBus::new(1000),
            MonitorSettings::default(),
            Arc::new(broker),
            Arc::clone(&provider) as Arc<dyn EmailProvider>,
        );
        (service, provider)
    }

    #[tokio::test]
    async fn send_with_disabled_provider_is_a_no_op() {
        let (service, provider) = service_with_provider();
        service.generate_tick().await;
        let before = service.email_stats().await;

        provider.set_enabled(false);
        let sent = service
            .send_email("ada@example.com", "Welcome", "Hello", None)
            .await;
        assert!(sent.is_none());
        assert_eq!(service.email_events(None).await.len(), 1);
        assert_eq!(service.email_stats().await.total_tracked, before.total_tracked);
    }

    #[tokio::test]
    async fn delivery_stats_distinguish_outage_from_unknown_message() {
        let (service, provider) = service_with_provider();
        let Some(email) = service
            .send_email("ada@example.com", "Welcome", "Hello", None)
            .await
        else {
            panic!("send failed");
        };

        provider.set_enabled(false);
        assert!(matches!(
            service.email_delivery_stats(&email.message_id),
            Err(MonitorError::EmailProviderUnavailable(_))
        ));

        provider.set_enabled(true);
        assert!(matches!(
            service.email_delivery_stats("msg_missing"),
            Err(MonitorError::EmailNotFound(_))
        ));
    }

    #[tokio::test]
    async fn with_clients_does_not_connect_the_broker() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let broker = Arc::new(SimulatedBroker::new(DEFAULT_BROKER_URL, Arc::clone(&clock)));
        let provider = SimulatedEmailProvider::new(
            None,
            DEFAULT_SENDER,
            ChaCha8Rng::seed_from_u64(1),
            Arc::clone(&clock),
        );
        let service = MonitorService::with_clients(
            MockGenerator::seeded(5),
            clock,
            EventBus::new(16),
            MonitorSettings::default(),
            Arc::clone(&broker) as Arc<dyn MessageBroker>,
            Arc::new(provider),
        );
        assert!(!service.broker().is_connected());
        assert!(service.queue_info("email-queue").is_none());
    }

    #[tokio::test]
    async fn pause_waits_for_an_in_flight_log_entry() {
        let (service, _) = make_service();
        let service = Arc::new(service);

        // Keep the generator busy so the log emission stalls mid-way.
        let generator = service.generator.lock().await;
        let emit = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.emit_log_entry().await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let pause = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.set_log_stream_active(false).await }
        });
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(!pause.is_finished());

        drop(generator);
        let Ok(emitted) = emit.await else {
            panic!("emit task failed");
        };
        let Ok(()) = pause.await else {
            panic!("pause task failed");
        };

        assert!(emitted.is_some());
        assert!(!service.log_stream_active().await);
        assert_eq!(service.log_entries(None).await.len(), 1);
        assert!(service.emit_log_entry().await.is_none());
        assert_eq!(service.log_entries(None).await.len(), 1);
    }

    #[tokio::test]
    async fn query_filters_delegate_to_store() {
        let (service, _) = make_service();
        for _ in 0..10 {
            service.generate_tick().await;
        }
        let by_type: usize = {
            let mut total = 0;
            for kind in DbOperation::ALL {
                total += service.events_by_type(kind).await.len();
            }
            total
        };
        assert_eq!(by_type, 10);
        assert_eq!(service.database_events(Some(4)).await.len(), 4);
        assert!(service.events_by_table("nope").await.is_empty());
    }
}
