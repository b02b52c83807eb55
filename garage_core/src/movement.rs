//! "Assume the door finished moving after N ms" as a cancellable one-shot.

use std::time::{Duration, Instant};

use crate::timeline::{Timeline, TimerHandle, TimerSlot};

#[derive(Debug, Clone, Copy)]
pub struct MovementTimer {
    slot: TimerSlot,
    duration: Duration,
}

impl MovementTimer {
    pub const fn new(duration: Duration) -> Self {
        Self {
            slot: TimerSlot::new(),
            duration,
        }
    }

    /// Arm for the full movement duration, replacing any pending timer.
    pub fn arm<E>(&mut self, timeline: &mut Timeline<E>, now: Instant, event: E) -> TimerHandle {
        let replaced = self.slot.cancel(timeline);
        tracing::debug!(
            after_ms = u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX),
            replaced,
            "queueing movement timer"
        );
        self.slot.arm(timeline, now, self.duration, event)
    }

    /// No-op when nothing is pending.
    pub fn cancel<E>(&mut self, timeline: &mut Timeline<E>) {
        if self.slot.cancel(timeline) {
            tracing::debug!("cancelled pending movement timer");
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    /// Clear the handle once its entry has fired. False for a stale handle.
    pub fn fired(&mut self, handle: TimerHandle) -> bool {
        self.slot.fired(handle)
    }
}
