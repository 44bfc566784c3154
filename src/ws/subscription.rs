//! Per-connection subscription manager.
//!
//! Tracks which topics a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::BTreeSet;

use crate::domain::Topic;

/// Manages the set of topic subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed topics. Ignored while `subscribe_all` is set.
    topics: BTreeSet<Topic>,
    /// Whether the client subscribed with the wildcard `"*"`.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds topics to the subscription set.
    pub fn subscribe(&mut self, topics: &[Topic], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.topics.extend(topics.iter().copied());
    }

    /// Removes topics from the subscription set. The wildcard clears
    /// everything.
    pub fn unsubscribe(&mut self, topics: &[Topic], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
            self.topics.clear();
            return;
        }
        for topic in topics {
            self.topics.remove(topic);
        }
    }

    /// Returns `true` if events on `topic` should be forwarded.
    #[must_use]
    pub fn matches(&self, topic: Topic) -> bool {
        self.subscribe_all || self.topics.contains(&topic)
    }

    /// Topics currently matched, in declaration order.
    #[must_use]
    pub fn active_topics(&self) -> Vec<Topic> {
        if self.subscribe_all {
            return Topic::ALL.to_vec();
        }
        self.topics.iter().copied().collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        for topic in Topic::ALL {
            assert!(!mgr.matches(topic));
        }
    }

    #[test]
    fn subscribe_specific_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Queue], false);
        assert!(mgr.matches(Topic::Queue));
        assert!(!mgr.matches(Topic::Email));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(Topic::ALL.iter().all(|t| mgr.matches(*t)));
        assert_eq!(mgr.active_topics().len(), Topic::ALL.len());
    }

    #[test]
    fn unsubscribe_removes_topic() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Database, Topic::Metrics], false);
        mgr.unsubscribe(&[Topic::Database], false);
        assert!(!mgr.matches(Topic::Database));
        assert_eq!(mgr.active_topics(), vec![Topic::Metrics]);
    }

    #[test]
    fn wildcard_unsubscribe_clears_all() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[Topic::Logs], true);
        mgr.unsubscribe(&[], true);
        assert!(!mgr.is_subscribed_all());
        assert!(!mgr.matches(Topic::Logs));
    }
}
