//! Digital pin access, the only view of the hardware the controller has.

use std::error::Error;

/// Errors cross this boundary boxed so implementations stay free to use
/// their own typed errors.
pub type GpioResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// How a pin is configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Floating input.
    Input,
    /// Input with the internal pull-down enabled; reads Low when nothing drives it.
    InputPullDown,
    /// Output driven to the given level immediately.
    Output(Level),
}

impl PinMode {
    #[inline]
    pub fn is_output(self) -> bool {
        matches!(self, PinMode::Output(_))
    }
}

/// Pin configure/read/write primitives, addressed by BCM pin number.
pub trait Gpio {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> GpioResult<()>;
    fn read_digital(&mut self, pin: u8) -> GpioResult<Level>;
    fn write_digital(&mut self, pin: u8, level: Level) -> GpioResult<()>;
}

impl<T: Gpio + ?Sized> Gpio for Box<T> {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> GpioResult<()> {
        (**self).configure_pin(pin, mode)
    }

    fn read_digital(&mut self, pin: u8) -> GpioResult<Level> {
        (**self).read_digital(pin)
    }

    fn write_digital(&mut self, pin: u8, level: Level) -> GpioResult<()> {
        (**self).write_digital(pin, level)
    }
}
