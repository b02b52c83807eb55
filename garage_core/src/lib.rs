#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Garage door controller core (hardware-agnostic).
//!
//! All pin access goes through `garage_traits::Gpio`; all outbound hub
//! traffic goes through `HubNotifier`.
//!
//! ## Architecture
//!
//! - **State**: door/target/calculated states and the button transition table (`state`)
//! - **Debounce**: 75% majority over the last four sensor readings (`debounce`)
//! - **Sensors**: two limit switches resolved to open/closed/stopped (`sensor`)
//! - **Timers**: a single deadline queue with cancellable handles (`timeline`, `movement`)
//! - **Requests**: FIFO of hub targets with completion signals (`queue`)
//! - **Controller**: poll loop, drain loop and button press (`controller`)
//! - **Runner**: single-owner event loop fed over a channel (`runner`)

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod hub;
pub mod hw_error;
pub mod movement;
pub mod queue;
pub mod runner;
pub mod sensor;
pub mod state;
pub mod timeline;

pub use config::ControllerConfig;
pub use controller::{DoorController, DoorControllerBuilder, Event};
pub use debounce::DebounceBuffer;
pub use error::{BuildError, GarageError, Result};
pub use hub::{HubEvent, HubNotifier, NullHub, RecordingHub};
pub use queue::{Completion, RequestOutcome};
pub use runner::HubHandle;
pub use sensor::{SensorReader, SensorSnapshot};
pub use state::{CalculatedState, DoorState, TargetState};
