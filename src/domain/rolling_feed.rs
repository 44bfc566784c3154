//! Bounded newest-first record sequence.
//!
//! [`RollingFeed`] keeps the most recent `capacity` records. Pushing
//! prepends; once the feed is full the oldest record (the tail) is dropped.
//! Recency is defined by insertion order, never by record timestamps.

use std::collections::VecDeque;

/// Default number of records a feed retains.
pub const DEFAULT_FEED_CAPACITY: usize = 50;

/// Largest capacity accepted from configuration.
pub const MAX_FEED_CAPACITY: usize = 1_000;

/// Fixed-capacity, most-recent-first sequence.
#[derive(Debug, Clone)]
pub struct RollingFeed<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingFeed<T> {
    /// Creates an empty feed holding at most `capacity` records.
    ///
    /// Storage grows on demand; only the default capacity is reserved up
    /// front.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(DEFAULT_FEED_CAPACITY)),
            capacity,
        }
    }

    /// Prepends `record`, returning the evicted oldest record if the feed
    /// was already full.
    pub fn push(&mut self, record: T) -> Option<T> {
        self.items.push_front(record);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Iterates from newest to oldest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator {
        self.items.iter()
    }

    /// Returns the newest record, if any.
    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the feed holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of records retained.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> RollingFeed<T> {
    /// Clones the newest `n` records, newest first.
    #[must_use]
    pub fn latest(&self, n: usize) -> Vec<T> {
        self.items.iter().take(n).cloned().collect()
    }

    /// Clones the whole feed, newest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for RollingFeed<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_prepends() {
        let mut feed = RollingFeed::new(3);
        feed.push(1);
        feed.push(2);
        assert_eq!(feed.to_vec(), vec![2, 1]);
        assert_eq!(feed.newest(), Some(&2));
    }

    #[test]
    fn overflow_keeps_most_recent_in_reverse_insertion_order() {
        let mut feed = RollingFeed::default();
        for i in 0..75 {
            feed.push(i);
        }
        assert_eq!(feed.len(), 50);
        let expected: Vec<i32> = (25..75).rev().collect();
        assert_eq!(feed.to_vec(), expected);
    }

    #[test]
    fn push_returns_evicted_tail() {
        let mut feed = RollingFeed::new(2);
        assert_eq!(feed.push('a'), None);
        assert_eq!(feed.push('b'), None);
        assert_eq!(feed.push('c'), Some('a'));
        assert_eq!(feed.to_vec(), vec!['c', 'b']);
    }

    #[test]
    fn latest_slices_from_the_front() {
        let mut feed = RollingFeed::new(10);
        for i in 0..6 {
            feed.push(i);
        }
        assert_eq!(feed.latest(3), vec![5, 4, 3]);
        assert_eq!(feed.latest(100).len(), 6);
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let mut feed = RollingFeed::new(0);
        assert_eq!(feed.push(1), Some(1));
        assert!(feed.is_empty());
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut feed = RollingFeed::new(usize::MAX);
        assert_eq!(feed.capacity(), usize::MAX);
        for i in 0..200 {
            assert_eq!(feed.push(i), None);
        }
        assert_eq!(feed.len(), 200);
    }
}
