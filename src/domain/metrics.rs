//! Dashboard metrics derived from the store and the rolling feeds.
//!
//! Everything here is a pure function of the current collections; the
//! caller decides when to recompute.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{EmailEvent, EmailStatus, QueueMessage, QueueStatus, RollingFeed, StoreMetrics};

/// Summary snapshot shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct SystemMetrics {
    /// Number of logged database events.
    pub total_events: usize,
    /// Percentage of database events with status `ERROR`.
    pub error_rate: f64,
    /// Mean database event duration in milliseconds.
    pub avg_response_time: f64,
    /// Pending messages in the queue feed.
    pub queue_depth: usize,
    /// Emails currently tracked in the email feed.
    pub emails_sent: usize,
    /// Percentage of tracked emails with status `DELIVERED`.
    pub email_delivery_rate: f64,
}

/// Recomputes [`SystemMetrics`] from the store metrics and both feeds.
///
/// `queue_depth` only sees the messages still held by the feed, and
/// `emails_sent` is the feed length, not a lifetime counter.
#[must_use]
pub fn aggregate(
    store: &StoreMetrics,
    queue: &RollingFeed<QueueMessage>,
    email: &RollingFeed<EmailEvent>,
) -> SystemMetrics {
    let queue_depth = queue.iter().filter(|m| m.is_pending()).count();
    let emails_sent = email.len();
    let delivered = email
        .iter()
        .filter(|e| e.status == EmailStatus::Delivered)
        .count();

    SystemMetrics {
        total_events: store.total_events,
        error_rate: store.error_rate,
        avg_response_time: store.avg_response_time,
        queue_depth,
        emails_sent,
        email_delivery_rate: percentage(delivered, emails_sent),
    }
}

/// Per-queue and per-status message counts over the queue feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct QueueStats {
    /// Messages in the feed.
    pub total: usize,
    /// Message count keyed by queue name.
    pub by_queue: BTreeMap<String, usize>,
    /// Message count keyed by status.
    pub by_status: BTreeMap<QueueStatus, usize>,
}

impl QueueStats {
    /// Tallies the current queue feed.
    #[must_use]
    pub fn from_feed(feed: &RollingFeed<QueueMessage>) -> Self {
        let mut stats = Self {
            total: feed.len(),
            ..Self::default()
        };
        for message in feed.iter() {
            *stats.by_queue.entry(message.queue.clone()).or_insert(0) += 1;
            *stats.by_status.entry(message.status).or_insert(0) += 1;
        }
        stats
    }
}

/// Delivery breakdown over the email feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
pub struct EmailStats {
    /// Emails in the feed.
    pub total: usize,
    /// Status `DELIVERED`.
    pub delivered: usize,
    /// Status `OPENED` or at least one open.
    pub opened: usize,
    /// Status `CLICKED` or at least one click.
    pub clicked: usize,
    /// Status `BOUNCED`.
    pub bounced: usize,
    /// Status `FAILED`.
    pub failed: usize,
    /// Emails tracked since startup, including those evicted from the feed.
    pub total_tracked: u64,
}

impl EmailStats {
    /// Tallies the current email feed; `total_tracked` is supplied by the
    /// caller since the feed cannot know what it evicted.
    #[must_use]
    pub fn from_feed(feed: &RollingFeed<EmailEvent>, total_tracked: u64) -> Self {
        let mut stats = Self {
            total: feed.len(),
            total_tracked,
            ..Self::default()
        };
        for email in feed.iter() {
            match email.status {
                EmailStatus::Delivered => stats.delivered += 1,
                EmailStatus::Bounced => stats.bounced += 1,
                EmailStatus::Failed => stats.failed += 1,
                EmailStatus::Sent | EmailStatus::Opened | EmailStatus::Clicked => {}
            }
            if email.was_opened() {
                stats.opened += 1;
            }
            if email.was_clicked() {
                stats.clicked += 1;
            }
        }
        stats
    }
}

/// `100 * part / whole`, or 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use chrono::Utc;

    fn message(queue: &str, status: QueueStatus) -> QueueMessage {
        QueueMessage {
            id: RecordId::new(),
            queue: queue.to_string(),
            exchange: "default".to_string(),
            routing_key: "key".to_string(),
            payload: serde_json::json!({ "data": "x" }),
            timestamp: Utc::now(),
            status,
            retry_count: 0,
            priority: 5,
        }
    }

    fn email(status: EmailStatus) -> EmailEvent {
        EmailEvent {
            id: RecordId::new(),
            to: "grace@example.com".to_string(),
            from: "noreply@trackingsystem.com".to_string(),
            subject: "Status".to_string(),
            timestamp: Utc::now(),
            status,
            message_id: RecordId::new().to_string(),
            template_id: None,
            opens: 0,
            clicks: 0,
        }
    }

    #[test]
    fn empty_inputs_produce_zero_rates() {
        let metrics = aggregate(
            &StoreMetrics::default(),
            &RollingFeed::default(),
            &RollingFeed::default(),
        );
        assert_eq!(metrics, SystemMetrics::default());
    }

    #[test]
    fn delivery_rate_counts_only_delivered() {
        let mut emails = RollingFeed::default();
        for status in [
            EmailStatus::Delivered,
            EmailStatus::Delivered,
            EmailStatus::Sent,
            EmailStatus::Failed,
        ] {
            emails.push(email(status));
        }
        let metrics = aggregate(&StoreMetrics::default(), &RollingFeed::default(), &emails);
        assert_eq!(metrics.emails_sent, 4);
        assert!((metrics.email_delivery_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn store_metrics_are_copied() {
        let store = StoreMetrics {
            total_events: 12,
            error_rate: 25.0,
            avg_response_time: 333.5,
            success_rate: 60.0,
        };
        let metrics = aggregate(&store, &RollingFeed::default(), &RollingFeed::default());
        assert_eq!(metrics.total_events, 12);
        assert_eq!(metrics.error_rate, 25.0);
        assert_eq!(metrics.avg_response_time, 333.5);
    }

    #[test]
    fn queue_depth_counts_pending_within_capacity_only() {
        let mut queue = RollingFeed::default();
        for i in 0..60 {
            let status = if i % 2 == 0 {
                QueueStatus::Pending
            } else {
                QueueStatus::Completed
            };
            queue.push(message("email-queue", status));
        }
        assert_eq!(queue.len(), 50);

        let pending_in_feed = queue.iter().filter(|m| m.is_pending()).count();
        let metrics = aggregate(&StoreMetrics::default(), &queue, &RollingFeed::default());
        assert_eq!(metrics.queue_depth, pending_in_feed);
        assert_eq!(metrics.queue_depth, 25);
    }

    #[test]
    fn queue_stats_group_by_queue_and_status() {
        let mut queue = RollingFeed::default();
        queue.push(message("email-queue", QueueStatus::Pending));
        queue.push(message("email-queue", QueueStatus::Failed));
        queue.push(message("processing-queue", QueueStatus::Pending));

        let stats = QueueStats::from_feed(&queue);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_queue.get("email-queue"), Some(&2));
        assert_eq!(stats.by_queue.get("processing-queue"), Some(&1));
        assert_eq!(stats.by_status.get(&QueueStatus::Pending), Some(&2));
        assert_eq!(stats.by_status.get(&QueueStatus::Completed), None);
    }

    #[test]
    fn email_stats_breakdown() {
        let mut feed = RollingFeed::default();
        feed.push(email(EmailStatus::Delivered));
        feed.push(email(EmailStatus::Opened));
        feed.push(EmailEvent {
            clicks: 2,
            ..email(EmailStatus::Delivered)
        });
        feed.push(email(EmailStatus::Bounced));
        feed.push(email(EmailStatus::Failed));

        let stats = EmailStats::from_feed(&feed, 80);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.opened, 1);
        assert_eq!(stats.clicked, 1);
        assert_eq!(stats.bounced, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_tracked, 80);
    }
}
