// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rolling event buffer with time-based eviction.

use std::collections::VecDeque;

use crate::midi::MidiEvent;

/// Append-only store of accepted events, bounded by age rather than count.
///
/// Invariant: events are in non-decreasing timestamp order, because the
/// session clock is monotonic and insertion order is arrival order.
/// Mutation is limited to appends at the tail and prefix eviction at the
/// head.
#[derive(Debug, Default)]
pub struct RollingBuffer {
    events: VecDeque<MidiEvent>,
}

impl RollingBuffer {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Append an event at the tail. O(1) amortized.
    pub fn append(&mut self, event: MidiEvent) {
        self.events.push_back(event);
    }

    /// Remove the contiguous prefix of events older than `cutoff_ts`.
    ///
    /// Events are ordered, so one scan from the head suffices; repeated
    /// eviction at the same cutoff is a no-op.
    pub fn evict_older_than(&mut self, cutoff_ts: f64) {
        while let Some(front) = self.events.front() {
            if front.timestamp < cutoff_ts {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// All events with `from_ts <= timestamp <= to_ts`, in order.
    /// The returned window is an owned copy; encoding it never aliases
    /// the live buffer.
    pub fn select_window(&self, from_ts: f64, to_ts: f64) -> Vec<MidiEvent> {
        self.events
            .iter()
            .filter(|e| e.timestamp >= from_ts && e.timestamp <= to_ts)
            .cloned()
            .collect()
    }

    /// Drop every buffered event
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the newest event, if any
    pub fn last_timestamp(&self) -> Option<f64> {
        self.events.back().map(|e| e.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_at(ts: f64) -> MidiEvent {
        MidiEvent::from_raw(ts, &[0x90, 60, 100], "test").unwrap()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut buffer = RollingBuffer::new();
        for ts in [0.0, 10.0, 10.0, 25.0] {
            buffer.append(note_at(ts));
        }
        assert_eq!(buffer.len(), 4);
        let all = buffer.select_window(f64::MIN, f64::MAX);
        let stamps: Vec<f64> = all.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 10.0, 10.0, 25.0]);
    }

    #[test]
    fn test_eviction_removes_prefix_only() {
        let mut buffer = RollingBuffer::new();
        for ts in [0.0, 1000.0, 2000.0, 3000.0] {
            buffer.append(note_at(ts));
        }

        buffer.evict_older_than(1500.0);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.select_window(0.0, 5000.0)[0].timestamp, 2000.0);
    }

    #[test]
    fn test_eviction_is_idempotent() {
        let mut buffer = RollingBuffer::new();
        for ts in [0.0, 1000.0, 2000.0] {
            buffer.append(note_at(ts));
        }

        buffer.evict_older_than(1000.0);
        let len_after_first = buffer.len();
        buffer.evict_older_than(1000.0);
        assert_eq!(buffer.len(), len_after_first);
        assert_eq!(buffer.len(), 2); // 1000.0 itself survives (not older)
    }

    #[test]
    fn test_age_bound_after_each_append() {
        let max_age = 90_000.0;
        let mut buffer = RollingBuffer::new();

        for i in 0..200 {
            let ts = i as f64 * 1000.0;
            buffer.append(note_at(ts));
            buffer.evict_older_than(ts - max_age);

            let oldest = buffer.select_window(f64::MIN, f64::MAX)[0].timestamp;
            assert!(oldest >= ts - max_age);
        }
    }

    #[test]
    fn test_select_window_is_inclusive() {
        let mut buffer = RollingBuffer::new();
        for ts in [500.0, 2000.0, 6000.0, 6500.0, 7000.0] {
            buffer.append(note_at(ts));
        }

        let window = buffer.select_window(500.0, 6500.0);
        let stamps: Vec<f64> = window.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![500.0, 2000.0, 6000.0, 6500.0]);
    }

    #[test]
    fn test_select_window_empty_range() {
        let mut buffer = RollingBuffer::new();
        buffer.append(note_at(1000.0));
        assert!(buffer.select_window(2000.0, 3000.0).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer = RollingBuffer::new();
        buffer.append(note_at(0.0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.last_timestamp(), None);
    }
}
