//! In-memory pin bank used for simulation and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use garage_traits::{Gpio, GpioResult, Level, PinMode};

use crate::error::HwError;

#[derive(Debug, Clone, Copy)]
struct PinState {
    mode: PinMode,
    level: Level,
}

#[derive(Debug, Default)]
struct Bank {
    pins: HashMap<u8, PinState>,
    /// Levels driven onto input pins from outside (the "physical world").
    external: HashMap<u8, Level>,
    writes: Vec<(u8, Level)>,
}

/// Simulated GPIO. Clones share one pin bank, so a test can hold a handle
/// to flip sensor inputs while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGpio {
    bank: Arc<Mutex<Bank>>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self::default()
    }

    fn bank(&self) -> Result<MutexGuard<'_, Bank>, HwError> {
        self.bank
            .lock()
            .map_err(|_| HwError::Gpio("simulated pin bank poisoned".into()))
    }

    /// Drive an input pin from the outside world. Takes effect whether or
    /// not the pin has been configured yet.
    pub fn set_input(&self, pin: u8, level: Level) {
        if let Ok(mut bank) = self.bank() {
            bank.external.insert(pin, level);
        }
    }

    /// Stop driving an input pin; it falls back to its pull.
    pub fn release_input(&self, pin: u8) {
        if let Ok(mut bank) = self.bank() {
            bank.external.remove(&pin);
        }
    }

    /// Current level of an output pin, if configured.
    pub fn output_level(&self, pin: u8) -> Option<Level> {
        let bank = self.bank().ok()?;
        bank.pins
            .get(&pin)
            .filter(|p| p.mode.is_output())
            .map(|p| p.level)
    }

    /// Mode a pin was configured with, if any.
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        let bank = self.bank().ok()?;
        bank.pins.get(&pin).map(|p| p.mode)
    }

    /// Every write issued so far, in order.
    pub fn writes(&self) -> Vec<(u8, Level)> {
        self.bank().map(|b| b.writes.clone()).unwrap_or_default()
    }

    /// Number of rising edges written to `pin`, i.e. button presses.
    pub fn press_count(&self, pin: u8) -> usize {
        self.writes()
            .iter()
            .filter(|(p, level)| *p == pin && level.is_high())
            .count()
    }
}

impl Gpio for SimulatedGpio {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> GpioResult<()> {
        let mut bank = self.bank()?;
        let level = match mode {
            PinMode::Output(level) => level,
            PinMode::Input | PinMode::InputPullDown => Level::Low,
        };
        bank.pins.insert(pin, PinState { mode, level });
        tracing::trace!(pin, ?mode, "sim pin configured");
        Ok(())
    }

    fn read_digital(&mut self, pin: u8) -> GpioResult<Level> {
        let bank = self.bank()?;
        let state = bank.pins.get(&pin).ok_or(HwError::UnknownPin(pin))?;
        if state.mode.is_output() {
            return Err(HwError::WrongMode {
                pin,
                expected: "input",
            }
            .into());
        }
        Ok(bank.external.get(&pin).copied().unwrap_or(state.level))
    }

    fn write_digital(&mut self, pin: u8, level: Level) -> GpioResult<()> {
        let mut bank = self.bank()?;
        let state = bank.pins.get_mut(&pin).ok_or(HwError::UnknownPin(pin))?;
        if !state.mode.is_output() {
            return Err(HwError::WrongMode {
                pin,
                expected: "output",
            }
            .into());
        }
        state.level = level;
        bank.writes.push((pin, level));
        Ok(())
    }
}
