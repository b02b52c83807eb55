//! Turns the two position sensor pins into one calculated door state.

use garage_traits::{Gpio, GpioResult, Level, PinMode};

use crate::state::CalculatedState;

/// Raw levels of both sensors from one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSnapshot {
    pub open: bool,
    pub closed: bool,
}

impl SensorSnapshot {
    /// Open wins over closed when both are asserted.
    pub const fn calculated(self) -> CalculatedState {
        if self.open {
            CalculatedState::Open
        } else if self.closed {
            CalculatedState::Closed
        } else {
            CalculatedState::Stopped
        }
    }

    pub const fn is_conflicting(self) -> bool {
        self.open && self.closed
    }
}

/// Pins of the open/closed limit sensors and their optional power pin.
#[derive(Debug, Clone, Copy)]
pub struct SensorReader {
    open_pin: u8,
    closed_pin: u8,
    power_pin: Option<u8>,
}

impl SensorReader {
    pub const fn new(open_pin: u8, closed_pin: u8, power_pin: Option<u8>) -> Self {
        Self {
            open_pin,
            closed_pin,
            power_pin,
        }
    }

    /// Sensors become pulled-down inputs; the power pin, if any, is driven high.
    pub fn configure(&self, gpio: &mut impl Gpio) -> GpioResult<()> {
        gpio.configure_pin(self.open_pin, PinMode::InputPullDown)?;
        gpio.configure_pin(self.closed_pin, PinMode::InputPullDown)?;
        if let Some(pin) = self.power_pin {
            gpio.configure_pin(pin, PinMode::Output(Level::High))?;
        }
        Ok(())
    }

    /// Read both pins without interpreting them.
    pub fn snapshot(&self, gpio: &mut impl Gpio) -> GpioResult<SensorSnapshot> {
        let open = gpio.read_digital(self.open_pin)?.is_high();
        let closed = gpio.read_digital(self.closed_pin)?.is_high();
        Ok(SensorSnapshot { open, closed })
    }

    /// Read both pins and resolve them to a calculated state.
    ///
    /// Both sensors asserted at once is physically impossible; it is logged
    /// and resolved as `Open`.
    pub fn read(&self, gpio: &mut impl Gpio) -> GpioResult<CalculatedState> {
        let snap = self.snapshot(gpio)?;
        if snap.is_conflicting() {
            tracing::warn!(
                open_pin = self.open_pin,
                closed_pin = self.closed_pin,
                "both sensors read as asserted; treating door as open"
            );
        }
        Ok(snap.calculated())
    }

    /// Drive the sensor power pin low, if there is one.
    pub fn power_down(&self, gpio: &mut impl Gpio) -> GpioResult<()> {
        match self.power_pin {
            Some(pin) => gpio.write_digital(pin, Level::Low),
            None => Ok(()),
        }
    }
}
