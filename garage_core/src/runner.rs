//! Owns a `DoorController` on one thread and feeds it hub commands.
//!
//! Hub bindings hold a cloneable `HubHandle` and talk to the controller
//! only through a channel, so controller state is never shared between
//! threads. The loop sleeps in `recv_deadline` until either a command
//! arrives or the next timer is due.

use std::thread::JoinHandle;

use crossbeam_channel as xch;
use garage_traits::Gpio;

use crate::controller::DoorController;
use crate::error::{GarageError, Result};
use crate::hub::HubNotifier;
use crate::queue::{Completion, RequestOutcome};
use crate::state::{DoorState, TargetState};

#[derive(Debug)]
pub enum Command {
    GetCurrent(xch::Sender<DoorState>),
    GetTarget(xch::Sender<TargetState>),
    SetTarget(TargetState, Completion),
    Shutdown,
}

/// Sending side of the command channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HubHandle {
    tx: xch::Sender<Command>,
}

pub fn channel() -> (HubHandle, xch::Receiver<Command>) {
    let (tx, rx) = xch::unbounded();
    (HubHandle { tx }, rx)
}

impl HubHandle {
    fn send(&self, cmd: Command) -> Result<()> {
        self.tx
            .send(cmd)
            .map_err(|_| eyre::Report::new(GarageError::Shutdown))
    }

    pub fn get_current_state(&self) -> Result<DoorState> {
        let (tx, rx) = xch::bounded(1);
        self.send(Command::GetCurrent(tx))?;
        rx.recv()
            .map_err(|_| eyre::Report::new(GarageError::Shutdown))
    }

    pub fn get_target_state(&self) -> Result<TargetState> {
        let (tx, rx) = xch::bounded(1);
        self.send(Command::GetTarget(tx))?;
        rx.recv()
            .map_err(|_| eyre::Report::new(GarageError::Shutdown))
    }

    /// Queue a target. The returned receiver yields once the request has
    /// been evaluated (immediately after the optimistic state update).
    pub fn set_target_state(&self, target: TargetState) -> Result<xch::Receiver<RequestOutcome>> {
        let (completion, rx) = Completion::channel();
        self.send(Command::SetTarget(target, completion))?;
        Ok(rx)
    }

    /// Ask the loop to stop. Harmless if it already has.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Apply one command. Returns false for `Shutdown`.
fn apply<G: Gpio, H: HubNotifier>(controller: &mut DoorController<G, H>, cmd: Command) -> bool {
    match cmd {
        Command::GetCurrent(reply) => {
            let _ = reply.send(controller.current_state());
        }
        Command::GetTarget(reply) => {
            let _ = reply.send(controller.target_state());
        }
        Command::SetTarget(target, completion) => controller.request(target, completion),
        Command::Shutdown => return false,
    }
    true
}

/// Drive `controller` until `Shutdown` arrives or every `HubHandle` is
/// dropped, then shut it down and hand it back.
pub fn run<G: Gpio, H: HubNotifier>(
    mut controller: DoorController<G, H>,
    commands: &xch::Receiver<Command>,
) -> Result<DoorController<G, H>> {
    tracing::debug!("runner started");
    loop {
        controller.fire_due();
        let received = match controller.next_deadline() {
            Some(deadline) => match commands.recv_deadline(deadline) {
                Ok(cmd) => Some(cmd),
                Err(xch::RecvTimeoutError::Timeout) => None,
                Err(xch::RecvTimeoutError::Disconnected) => break,
            },
            None => match commands.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };
        if let Some(cmd) = received {
            if !apply(&mut controller, cmd) {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }
    controller.shutdown()?;
    Ok(controller)
}

/// Move `controller` onto its own thread and return a handle to it.
pub fn spawn<G, H>(
    controller: DoorController<G, H>,
) -> (HubHandle, JoinHandle<Result<DoorController<G, H>>>)
where
    G: Gpio + Send + 'static,
    H: HubNotifier + Send + 'static,
{
    let (handle, rx) = channel();
    let join = std::thread::spawn(move || run(controller, &rx));
    (handle, join)
}
