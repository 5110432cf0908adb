/// Bounded, ordered, append-only event log.
///
/// The log is the service's auditable record of notable occurrences:
/// startup, tile coverage load, mode switches, risk transitions, point
/// queries, report generation. Entries are held newest-first and capped;
/// appending past the cap evicts the oldest. Entries are never mutated
/// after creation, and readers get a point-in-time copy.

use chrono::Local;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Default retention bound.
pub const DEFAULT_CAPACITY: usize = 50;

/// One immutable log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventEntry {
    /// Wall-clock time of day the entry was appended, e.g. "14:03:27".
    pub time: String,
    pub message: String,
}

/// Thread-safe bounded log, shared between the scheduler, the mode
/// controller, the probe, and display consumers via `Arc<EventLog>`.
pub struct EventLog {
    entries: Mutex<VecDeque<EventEntry>>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        EventLog {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Prepends a timestamped entry, then truncates to the retention bound
    /// (oldest entries dropped).
    pub fn append(&self, message: impl Into<String>) {
        let entry = EventEntry {
            time: Local::now().format("%H:%M:%S").to_string(),
            message: message.into(),
        };
        let mut entries = self.entries.lock().unwrap();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Point-in-time copy of the log, newest first.
    pub fn snapshot(&self) -> Vec<EventEntry> {
        self.entries.lock().unwrap().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_orders_newest_first() {
        let log = EventLog::new();
        log.append("first");
        log.append("second");
        log.append("third");

        let entries = log.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "third");
        assert_eq!(entries[1].message, "second");
        assert_eq!(entries[2].message, "first");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let log = EventLog::new();
        for i in 0..60 {
            log.append(format!("event {}", i));
        }

        let entries = log.snapshot();
        assert_eq!(entries.len(), 50, "log must be capped at 50 entries");
        assert_eq!(entries[0].message, "event 59", "newest entry survives at the front");
        assert_eq!(entries[49].message, "event 10", "the 10 oldest entries were evicted");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let log = EventLog::new();
        log.append("original");

        let before = log.snapshot();
        log.append("later");

        assert_eq!(before.len(), 1, "earlier snapshot must not grow");
        assert_eq!(log.snapshot().len(), 2);
    }

    #[test]
    fn test_custom_capacity() {
        let log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.append(format!("e{}", i));
        }
        let entries = log.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].message, "e2");
    }
}
