//! Bounded channel-event journal.
//!
//! Every accepted transition appends one [`EventRecord`]. Sequence numbers
//! are monotonic for the life of the engine and survive eviction: when the
//! journal reaches `max_size`, the oldest record is dropped to make room.

use std::collections::VecDeque;

use iouvault_types::{Address, ChannelEvent, EventRecord};

/// Append-only, size-bounded log of channel events.
pub struct EventJournal {
    /// Retained records, oldest first.
    records: VecDeque<EventRecord>,
    /// Sequence number the next record receives.
    next_sequence: u64,
    /// Maximum number of retained records.
    max_size: usize,
}

impl EventJournal {
    /// Create a journal retaining at most `max_size` records.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "EventJournal max_size must be > 0");
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            next_sequence: 0,
            max_size,
        }
    }

    /// Append an event, evicting the oldest if full. Returns its sequence.
    pub fn record(&mut self, block: u64, resource: Address, event: ChannelEvent) -> u64 {
        if self.records.len() >= self.max_size {
            self.records.pop_front();
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.push_back(EventRecord {
            sequence,
            block,
            resource,
            event,
        });
        sequence
    }

    /// Retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Retained records for one resource, oldest first.
    #[must_use]
    pub fn for_resource(&self, resource: Address) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.resource == resource)
            .collect()
    }

    /// Most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&EventRecord> {
        self.records.back()
    }

    /// Sequence number the next record will receive.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use iouvault_types::U256;

    use super::*;

    fn deposit(n: u64) -> ChannelEvent {
        ChannelEvent::NativeDeposited {
            amount: U256::from(n),
        }
    }

    #[test]
    fn sequences_are_monotonic() {
        let mut j = EventJournal::new(10);
        let r = Address::repeat_byte(1);
        assert_eq!(j.record(1, r, deposit(1)), 0);
        assert_eq!(j.record(2, r, deposit(2)), 1);
        assert_eq!(j.next_sequence(), 2);
        assert_eq!(j.latest().unwrap().block, 2);
    }

    #[test]
    fn evicts_oldest() {
        let mut j = EventJournal::new(2);
        let r = Address::repeat_byte(1);
        j.record(1, r, deposit(1));
        j.record(2, r, deposit(2));
        j.record(3, r, deposit(3));

        assert_eq!(j.len(), 2);
        let seqs: Vec<u64> = j.iter().map(|rec| rec.sequence).collect();
        assert_eq!(seqs, vec![1, 2], "sequence 0 should have been evicted");
    }

    #[test]
    fn filters_by_resource() {
        let mut j = EventJournal::new(10);
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        j.record(1, a, deposit(1));
        j.record(1, b, deposit(2));
        j.record(2, a, deposit(3));
        assert_eq!(j.for_resource(a).len(), 2);
        assert_eq!(j.for_resource(b).len(), 1);
    }

    #[test]
    fn empty_journal() {
        let j = EventJournal::new(1);
        assert!(j.is_empty());
        assert!(j.latest().is_none());
    }

    #[test]
    #[should_panic(expected = "max_size must be > 0")]
    fn zero_max_size_panics() {
        let _ = EventJournal::new(0);
    }
}
