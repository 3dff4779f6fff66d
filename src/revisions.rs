//! Bounded EEW revision tracker.
//!
//! Keeps the latest serial seen for each alert id in a fixed-size ring and
//! decides whether an incoming revision should be acted on.
//! Follows NASA Power of 10: bounded resources regardless of stream duration.

use std::collections::VecDeque;

/// Default capacity for the revision ring.
/// Far more concurrent alert ids than any provider issues in a day.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// A bounded ring of alert ids and their latest revision.
///
/// Uses a fixed-capacity ring. When full, the oldest non-final entry is
/// evicted first so finished alerts keep rejecting late revisions; only a
/// ring made entirely of final entries drops its oldest final one.
#[derive(Debug)]
pub struct RevisionTracker {
    /// Ring of tracked alerts (oldest at front, newest at back)
    seen: VecDeque<SeenAlert>,
    /// Maximum capacity
    capacity: usize,
    /// Total revisions checked (for stats)
    total_seen: u64,
    /// Total revisions rejected
    total_rejected: u64,
}

/// An entry in the revision ring.
#[derive(Debug, Clone)]
struct SeenAlert {
    id: String,
    serial: u32,
    is_final: bool,
}

impl RevisionTracker {
    /// Create a new tracker with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");

        Self {
            seen: VecDeque::with_capacity(capacity),
            capacity,
            total_seen: 0,
            total_rejected: 0,
        }
    }

    /// Create a new tracker with default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Classify a revision and record it if it is accepted.
    ///
    /// Serials must not go backwards for an id, and nothing is accepted after
    /// a final revision.
    pub fn check_and_mark(&mut self, id: &str, serial: u32, is_final: bool) -> RevisionResult {
        self.total_seen += 1;

        let result = if let Some(pos) = self.find_position(id) {
            let entry = &mut self.seen[pos];
            if entry.is_final {
                RevisionResult::AfterFinal
            } else if serial > entry.serial {
                entry.serial = serial;
                entry.is_final = is_final;
                RevisionResult::Updated
            } else if serial == entry.serial {
                RevisionResult::Duplicate
            } else {
                RevisionResult::OutOfOrder
            }
        } else {
            self.insert(id.to_string(), serial, is_final);
            RevisionResult::New
        };

        if !result.should_emit() {
            self.total_rejected += 1;
        }
        result
    }

    /// Find the position of an id in the ring.
    fn find_position(&self, id: &str) -> Option<usize> {
        self.seen.iter().position(|e| e.id == id)
    }

    /// Insert a new entry, evicting if at capacity.
    fn insert(&mut self, id: String, serial: u32, is_final: bool) {
        if self.seen.len() >= self.capacity {
            match self.seen.iter().position(|e| !e.is_final) {
                Some(pos) => {
                    self.seen.remove(pos);
                }
                None => {
                    self.seen.pop_front();
                }
            }
        }

        self.seen.push_back(SeenAlert {
            id,
            serial,
            is_final,
        });

        debug_assert!(self.seen.len() <= self.capacity);
    }

    /// Latest accepted serial for an id.
    #[must_use]
    pub fn latest_serial(&self, id: &str) -> Option<u32> {
        self.find_position(id).map(|pos| self.seen[pos].serial)
    }

    /// Get the current number of tracked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Get total revisions checked.
    #[must_use]
    pub fn total_seen(&self) -> u64 {
        self.total_seen
    }

    /// Get total revisions rejected.
    #[must_use]
    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }
}

impl Default for RevisionTracker {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Result of a revision check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionResult {
    /// First revision of an alert id
    New,
    /// Newer serial for a known id
    Updated,
    /// Same serial as the latest one
    Duplicate,
    /// Older serial than the latest one
    OutOfOrder,
    /// The id already had a final revision
    AfterFinal,
}

impl RevisionResult {
    /// Check if this revision should be acted on.
    #[must_use]
    pub fn should_emit(self) -> bool {
        matches!(self, Self::New | Self::Updated)
    }

    /// Check if this revises an alert already seen.
    #[must_use]
    pub fn is_update(self) -> bool {
        matches!(self, Self::Updated)
    }

    /// Short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Duplicate => "duplicate",
            Self::OutOfOrder => "out of order",
            Self::AfterFinal => "after final",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_alerts() {
        let mut tracker = RevisionTracker::new(100);

        assert_eq!(tracker.check_and_mark("a", 1, false), RevisionResult::New);
        assert_eq!(tracker.check_and_mark("b", 1, false), RevisionResult::New);

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.total_seen(), 2);
        assert_eq!(tracker.total_rejected(), 0);
    }

    #[test]
    fn test_serial_updates() {
        let mut tracker = RevisionTracker::new(100);

        assert_eq!(tracker.check_and_mark("a", 1, false), RevisionResult::New);
        assert_eq!(tracker.check_and_mark("a", 2, false), RevisionResult::Updated);
        assert_eq!(tracker.check_and_mark("a", 5, false), RevisionResult::Updated);
        assert_eq!(tracker.latest_serial("a"), Some(5));
    }

    #[test]
    fn test_duplicate_and_out_of_order() {
        let mut tracker = RevisionTracker::new(100);

        tracker.check_and_mark("a", 3, false);
        assert_eq!(tracker.check_and_mark("a", 3, false), RevisionResult::Duplicate);
        assert_eq!(tracker.check_and_mark("a", 2, false), RevisionResult::OutOfOrder);

        assert_eq!(tracker.latest_serial("a"), Some(3));
        assert_eq!(tracker.total_rejected(), 2);
    }

    #[test]
    fn test_final_is_terminal() {
        let mut tracker = RevisionTracker::new(100);

        tracker.check_and_mark("a", 1, false);
        assert_eq!(tracker.check_and_mark("a", 2, true), RevisionResult::Updated);
        assert_eq!(tracker.check_and_mark("a", 3, false), RevisionResult::AfterFinal);
        assert_eq!(tracker.check_and_mark("a", 2, true), RevisionResult::AfterFinal);

        // A first revision may itself be final.
        assert_eq!(tracker.check_and_mark("b", 1, true), RevisionResult::New);
        assert_eq!(tracker.check_and_mark("b", 2, false), RevisionResult::AfterFinal);
    }

    #[test]
    fn test_bounded_capacity() {
        let mut tracker = RevisionTracker::new(2);

        tracker.check_and_mark("a", 1, false);
        tracker.check_and_mark("b", 1, false);
        tracker.check_and_mark("c", 1, false);
        assert_eq!(tracker.len(), 2);

        // "a" was evicted and is new again
        assert_eq!(tracker.check_and_mark("a", 1, false), RevisionResult::New);
        assert_eq!(tracker.check_and_mark("c", 1, false), RevisionResult::Duplicate);
    }

    #[test]
    fn test_final_entries_outlive_open_ones() {
        let mut tracker = RevisionTracker::new(2);

        tracker.check_and_mark("a", 3, true);
        tracker.check_and_mark("b", 1, false);
        tracker.check_and_mark("c", 1, false);
        assert_eq!(tracker.len(), 2);

        // "b" was evicted instead of the finished "a"
        assert_eq!(tracker.check_and_mark("a", 4, false), RevisionResult::AfterFinal);
        assert_eq!(tracker.latest_serial("b"), None);
        assert_eq!(tracker.check_and_mark("c", 1, false), RevisionResult::Duplicate);
    }

    #[test]
    fn test_all_final_ring_drops_oldest() {
        let mut tracker = RevisionTracker::new(2);

        tracker.check_and_mark("a", 1, true);
        tracker.check_and_mark("b", 1, true);
        tracker.check_and_mark("c", 1, true);

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.latest_serial("a"), None);
        assert_eq!(tracker.check_and_mark("b", 2, false), RevisionResult::AfterFinal);
    }

    #[test]
    fn test_sample_replay_stream() {
        let stream = include_str!("../tools/sample_replay.ndjson");
        let mut tracker = RevisionTracker::default();

        let results: Vec<RevisionResult> = stream
            .lines()
            .map(|line| {
                let raw: crate::models::RawEew = serde_json::from_str(line).unwrap();
                tracker.check_and_mark(&raw.id, raw.serial, raw.final_flag.is_set())
            })
            .collect();

        assert_eq!(
            results,
            vec![
                RevisionResult::New,
                RevisionResult::Updated,
                RevisionResult::Duplicate,
                RevisionResult::Updated,
                RevisionResult::AfterFinal,
            ]
        );
    }

    #[test]
    fn test_should_emit() {
        assert!(RevisionResult::New.should_emit());
        assert!(RevisionResult::Updated.should_emit());
        assert!(!RevisionResult::Duplicate.should_emit());
        assert!(!RevisionResult::OutOfOrder.should_emit());
        assert!(!RevisionResult::AfterFinal.should_emit());
        assert!(RevisionResult::Updated.is_update());
    }
}
