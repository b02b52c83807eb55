//! Single-threaded deadline queue with cancellable handles.
//!
//! Every deferred action in the controller (the next poll, the two halves
//! of a button press, the movement timer, the end of the grace period) is
//! an entry here. Entries fire one at a time in deadline order; entries
//! sharing a deadline fire in the order they were scheduled.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

/// Identifies one scheduled entry. Never reused within a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug)]
pub struct Timeline<E> {
    heap: BinaryHeap<Reverse<(Instant, u64)>>,
    // live entries; cancelling removes the payload and leaves the heap slot
    live: HashMap<u64, E>,
    next_seq: u64,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire `after` from `now`.
    pub fn schedule(&mut self, now: Instant, after: Duration, event: E) -> TimerHandle {
        self.schedule_at(now + after, event)
    }

    fn schedule_at(&mut self, deadline: Instant, event: E) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq)));
        self.live.insert(seq, event);
        TimerHandle(seq)
    }

    /// Cancel a pending entry. Returns false if it already fired or was
    /// already cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.live.remove(&handle.0).is_some()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.live.contains_key(&handle.0)
    }

    /// Remove and return the earliest live entry due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, E)> {
        while let Some(Reverse((deadline, seq))) = self.heap.peek().copied() {
            if deadline > now {
                return None;
            }
            self.heap.pop();
            if let Some(event) = self.live.remove(&seq) {
                return Some((TimerHandle(seq), event));
            }
        }
        None
    }

    /// Deadline of the earliest live entry. Drops cancelled entries it
    /// finds at the head.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(Reverse((deadline, seq))) = self.heap.peek().copied() {
            if self.live.contains_key(&seq) {
                return Some(deadline);
            }
            self.heap.pop();
        }
        None
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }
}

/// Holds at most one pending entry. Arming replaces (and cancels) the
/// previous one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerSlot {
    handle: Option<TimerHandle>,
}

impl TimerSlot {
    pub const fn new() -> Self {
        Self { handle: None }
    }

    pub fn arm<E>(
        &mut self,
        timeline: &mut Timeline<E>,
        now: Instant,
        after: Duration,
        event: E,
    ) -> TimerHandle {
        self.cancel(timeline);
        let handle = timeline.schedule(now, after, event);
        self.handle = Some(handle);
        handle
    }

    /// Idempotent. Returns true if something was actually cancelled.
    pub fn cancel<E>(&mut self, timeline: &mut Timeline<E>) -> bool {
        self.handle
            .take()
            .is_some_and(|handle| timeline.cancel(handle))
    }

    pub const fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Record that `handle` fired. Returns false if it is not the entry
    /// this slot holds (a stale handle is left alone).
    pub fn fired(&mut self, handle: TimerHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }
}
