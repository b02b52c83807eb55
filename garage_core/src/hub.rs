//! Outbound notifications to the home-automation hub.

use std::sync::{Arc, Mutex};

use crate::state::{DoorState, TargetState};

/// Receives state pushes from the controller. Fire-and-forget.
pub trait HubNotifier {
    fn push_current_state(&mut self, state: DoorState);
    fn push_target_state(&mut self, target: TargetState);
}

impl<T: HubNotifier + ?Sized> HubNotifier for Box<T> {
    fn push_current_state(&mut self, state: DoorState) {
        (**self).push_current_state(state);
    }

    fn push_target_state(&mut self, target: TargetState) {
        (**self).push_target_state(target);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHub;

impl HubNotifier for NullHub {
    fn push_current_state(&mut self, _state: DoorState) {}
    fn push_target_state(&mut self, _target: TargetState) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubEvent {
    Current(DoorState),
    Target(TargetState),
}

/// Records pushes in order. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingHub {
    events: Arc<Mutex<Vec<HubEvent>>>,
}

impl RecordingHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HubEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn current_pushes(&self) -> Vec<DoorState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HubEvent::Current(s) => Some(s),
                HubEvent::Target(_) => None,
            })
            .collect()
    }

    pub fn target_pushes(&self) -> Vec<TargetState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HubEvent::Target(t) => Some(t),
                HubEvent::Current(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut e) = self.events.lock() {
            e.clear();
        }
    }

    fn record(&self, event: HubEvent) {
        if let Ok(mut e) = self.events.lock() {
            e.push(event);
        }
    }
}

impl HubNotifier for RecordingHub {
    fn push_current_state(&mut self, state: DoorState) {
        self.record(HubEvent::Current(state));
    }

    fn push_target_state(&mut self, target: TargetState) {
        self.record(HubEvent::Target(target));
    }
}
