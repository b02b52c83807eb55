//! Majority-vote smoothing over the last few sensor readings.

use std::collections::VecDeque;

/// Default number of readings kept.
pub const DEFAULT_CAPACITY: usize = 4;

/// Fixed-capacity ring of recent readings.
///
/// A prediction exists only when one value fills at least 75% of the
/// current occupancy, so a single glitchy read never flips the result.
#[derive(Debug, Clone)]
pub struct DebounceBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy + Eq> Default for DebounceBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<T: Copy + Eq> DebounceBuffer<T> {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest once full.
    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    /// The value holding >= 75% of the buffer, if any.
    pub fn predict(&self) -> Option<T> {
        // (value, count) in first-seen order; at most `capacity` entries
        let mut counts: Vec<(T, usize)> = Vec::with_capacity(self.buf.len());
        for v in &self.buf {
            match counts.iter_mut().find(|(seen, _)| seen == v) {
                Some((_, n)) => *n += 1,
                None => counts.push((*v, 1)),
            }
        }
        let (value, count) = counts
            .into_iter()
            .fold(None, |best: Option<(T, usize)>, next| match best {
                Some(b) if b.1 >= next.1 => Some(b),
                _ => Some(next),
            })?;
        // count / len >= 0.75 without floats
        (count * 4 >= self.buf.len() * 3).then_some(value)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Readings oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_prediction() {
        let b: DebounceBuffer<u8> = DebounceBuffer::default();
        assert_eq!(b.predict(), None);
    }

    #[test]
    fn three_of_four_wins() {
        let mut b = DebounceBuffer::new(4);
        for v in ['a', 'a', 'a', 'b'] {
            b.push(v);
        }
        assert_eq!(b.predict(), Some('a'));
    }

    #[test]
    fn even_split_has_no_prediction() {
        let mut b = DebounceBuffer::new(4);
        for v in ['a', 'a', 'b', 'b'] {
            b.push(v);
        }
        assert_eq!(b.predict(), None);
    }

    #[test]
    fn oldest_is_evicted() {
        let mut b = DebounceBuffer::new(4);
        for v in [1, 2, 2, 2, 2] {
            b.push(v);
        }
        assert_eq!(b.len(), 4);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec![2, 2, 2, 2]);
    }

    #[test]
    fn partial_buffer_uses_current_occupancy() {
        let mut b = DebounceBuffer::new(4);
        b.push(7);
        assert_eq!(b.predict(), Some(7));
        b.push(8);
        // 1 of 2 is 50%
        assert_eq!(b.predict(), None);
    }

    #[test]
    fn zero_capacity_is_bumped() {
        let mut b = DebounceBuffer::new(0);
        b.push(1);
        b.push(2);
        assert_eq!(b.len(), 1);
        assert_eq!(b.predict(), Some(2));
    }
}
