//! FIFO of hub "move to" requests with one-shot completion signals.

use std::collections::VecDeque;

use crossbeam_channel as xch;

use crate::state::{DoorState, TargetState};

/// What happened to a request once it reached the head of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The door was already at or heading to the target. No press.
    AlreadySatisfied { state: DoorState },
    /// The button was pressed and the state optimistically moved.
    Pressed { from: DoorState, to: DoorState },
}

/// Fires at most once. Dropping it without completing is fine.
#[derive(Debug, Default)]
pub struct Completion {
    tx: Option<xch::Sender<RequestOutcome>>,
}

impl Completion {
    /// A completion plus the receiver the requester waits on.
    pub fn channel() -> (Self, xch::Receiver<RequestOutcome>) {
        let (tx, rx) = xch::bounded(1);
        (Self { tx: Some(tx) }, rx)
    }

    pub fn complete(&mut self, outcome: RequestOutcome) {
        if let Some(tx) = self.tx.take() {
            // requester may have stopped waiting
            let _ = tx.try_send(outcome);
        }
    }
}

#[derive(Debug)]
pub struct PendingRequest {
    pub target: TargetState,
    pub completion: Completion,
}

#[derive(Debug, Default)]
pub struct RequestQueue {
    items: VecDeque<PendingRequest>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request. Returns true when the queue was empty before, in
    /// which case the caller must start draining.
    pub fn push(&mut self, target: TargetState, completion: Completion) -> bool {
        let was_empty = self.items.is_empty();
        self.items.push_back(PendingRequest { target, completion });
        was_empty
    }

    pub fn front_mut(&mut self) -> Option<&mut PendingRequest> {
        self.items.front_mut()
    }

    pub fn pop(&mut self) -> Option<PendingRequest> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
