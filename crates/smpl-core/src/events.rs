//! # smpl-core::events
//!
//! Defines the future-event list (EL): the priority queue of pending events
//! ordered by simulated time, with stable FIFO tie-breaking on insertion
//! order (invariant 2 of the data model). A `BinaryHeap` is a max-heap, so
//! the comparator below is reversed to make it behave as a min-heap over
//! `(time, insert_seq)`.

use crate::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What `cause()` hands back to the caller: the application-defined `code`
/// of whatever just happened, and the opaque `token` identifying the
/// subject process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<Token> {
    pub code: i64,
    pub token: Token,
}

/// An entry in the event list: an event plus its scheduling key.
///
/// Pending retries for a blocked `request` are deliberately *not*
/// represented here — see `DESIGN.md` for why this kernel takes the
/// "keep pending events out of EL entirely" design from the spec's Design
/// Notes. Every `Queued<Token>` in the heap is a live, firable event.
#[derive(Debug)]
struct Queued<Token> {
    time: SimTime,
    /// Monotonic sequence number assigned at insertion, used purely to
    /// break ties between events scheduled for the same `time` in FIFO
    /// order (invariant 2).
    insert_seq: u64,
    code: i64,
    token: Token,
}

impl<Token> PartialEq for Queued<Token> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.insert_seq == other.insert_seq
    }
}

impl<Token> Eq for Queued<Token> {}

impl<Token> PartialOrd for Queued<Token> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Token> Ord for Queued<Token> {
    /// Reversed so `BinaryHeap` (a max-heap) pops the earliest `time` first,
    /// and among equal times, the earliest `insert_seq` first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.insert_seq.cmp(&self.insert_seq))
    }
}

/// The future-event list: supports insertion at an absolute time and
/// removal of the earliest-firing event.
#[derive(Debug)]
pub struct EventList<Token> {
    heap: BinaryHeap<Queued<Token>>,
    next_seq: u64,
}

impl<Token> EventList<Token> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Places an event at absolute time `time`, stamped with a fresh
    /// insertion sequence number for stable tie-breaking.
    pub fn insert(&mut self, code: i64, token: Token, time: SimTime) {
        let insert_seq = self.next_seq;
        self.next_seq = self.next_seq.checked_add(1).expect("insertion sequence overflow");
        self.heap.push(Queued {
            time,
            insert_seq,
            code,
            token,
        });
    }

    /// Removes and returns the earliest-firing event, or `None` if the
    /// list is empty.
    pub fn pop_min(&mut self) -> Option<(SimTime, Fired<Token>)> {
        self.heap.pop().map(|q| (q.time, Fired { code: q.code, token: q.token }))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<Token> Default for EventList<Token> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_min_orders_by_time() {
        let mut el: EventList<&'static str> = EventList::new();
        el.insert(1, "c", SimTime::new(3.0));
        el.insert(2, "a", SimTime::new(1.0));
        el.insert(3, "b", SimTime::new(2.0));

        let (t1, e1) = el.pop_min().unwrap();
        let (t2, e2) = el.pop_min().unwrap();
        let (t3, e3) = el.pop_min().unwrap();

        assert_eq!((t1.as_f64(), e1.token), (1.0, "a"));
        assert_eq!((t2.as_f64(), e2.token), (2.0, "b"));
        assert_eq!((t3.as_f64(), e3.token), (3.0, "c"));
        assert!(el.pop_min().is_none());
    }

    #[test]
    fn ties_break_fifo_on_insertion_order() {
        let mut el: EventList<u32> = EventList::new();
        el.insert(1, 10, SimTime::new(5.0));
        el.insert(1, 20, SimTime::new(5.0));
        el.insert(1, 30, SimTime::new(5.0));

        let order: Vec<u32> = std::iter::from_fn(|| el.pop_min().map(|(_, e)| e.token)).collect();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn empty_list_pops_none() {
        let mut el: EventList<()> = EventList::new();
        assert!(el.is_empty());
        assert!(el.pop_min().is_none());
    }
}
