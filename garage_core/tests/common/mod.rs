#![allow(dead_code)]

use std::time::Duration;

use garage_core::{ControllerConfig, DoorController, RecordingHub};
use garage_hardware::SimulatedGpio;
use garage_traits::{Level, ManualClock};

pub const BUTTON: u8 = 17;
pub const OPEN: u8 = 27;
pub const CLOSED: u8 = 22;
pub const POWER: u8 = 23;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn config() -> ControllerConfig {
    ControllerConfig {
        name: "Garage".into(),
        button_pin: BUTTON,
        open_sensor_pin: OPEN,
        closed_sensor_pin: CLOSED,
        sensor_power_pin: Some(POWER),
        polling_interval: ms(250),
        press_duration: ms(300),
        movement_duration: ms(10_000),
        debounce_capacity: 4,
    }
}

/// Where the physical door is, as the sensors see it.
#[derive(Debug, Clone, Copy)]
pub enum Door {
    Open,
    Closed,
    Between,
    Both,
}

pub fn place(gpio: &SimulatedGpio, door: Door) {
    let (open, closed) = match door {
        Door::Open => (true, false),
        Door::Closed => (false, true),
        Door::Between => (false, false),
        Door::Both => (true, true),
    };
    for (pin, asserted) in [(OPEN, open), (CLOSED, closed)] {
        if asserted {
            gpio.set_input(pin, Level::High);
        } else {
            // an open switch leaves the line to its pull-down
            gpio.release_input(pin);
        }
    }
}

/// Controller on simulated pins and virtual time. The handles share state
/// with the ones the controller owns.
pub struct Rig {
    pub world: SimulatedGpio,
    pub hub: RecordingHub,
    pub clock: ManualClock,
    pub ctl: DoorController<SimulatedGpio, RecordingHub>,
}

impl Rig {
    pub fn new(door: Door) -> Self {
        Self::with_config(door, config())
    }

    pub fn with_config(door: Door, cfg: ControllerConfig) -> Self {
        let world = SimulatedGpio::new();
        place(&world, door);
        let hub = RecordingHub::new();
        let clock = ManualClock::new();
        let ctl = DoorController::builder()
            .gpio(world.clone())
            .hub(hub.clone())
            .config(cfg)
            .clock(clock.clone())
            .try_build()
            .expect("controller build");
        Self {
            world,
            hub,
            clock,
            ctl,
        }
    }

    /// Let the poll loop fill the debounce buffer with the current reading.
    pub fn settled(mut self) -> Self {
        self.ctl.advance(ms(1000));
        self
    }

    pub fn place(&self, door: Door) {
        place(&self.world, door);
    }

    pub fn advance(&mut self, d: Duration) {
        self.ctl.advance(d);
    }

    /// Virtual milliseconds since the rig was built.
    pub fn now_ms(&self) -> u128 {
        self.clock.elapsed().as_millis()
    }

    pub fn presses(&self) -> usize {
        self.world.press_count(BUTTON)
    }
}
