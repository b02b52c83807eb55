//! Raspberry Pi GPIO through rppal.

use std::collections::HashMap;

use garage_traits::{Gpio, GpioResult, Level, PinMode};
use rppal::gpio::{InputPin, OutputPin};
use tracing::debug;

use crate::error::{HwError, Result};

enum Pin {
    Input(InputPin),
    Output(OutputPin),
}

pub struct RppalGpio {
    gpio: rppal::gpio::Gpio,
    pins: HashMap<u8, Pin>,
}

impl RppalGpio {
    pub fn new() -> Result<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self {
            gpio,
            pins: HashMap::new(),
        })
    }
}

impl std::fmt::Debug for RppalGpio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pins: Vec<_> = self.pins.keys().copied().collect();
        pins.sort_unstable();
        f.debug_struct("RppalGpio").field("pins", &pins).finish()
    }
}

fn to_rppal(level: Level) -> rppal::gpio::Level {
    match level {
        Level::High => rppal::gpio::Level::High,
        Level::Low => rppal::gpio::Level::Low,
    }
}

fn from_rppal(level: rppal::gpio::Level) -> Level {
    match level {
        rppal::gpio::Level::High => Level::High,
        rppal::gpio::Level::Low => Level::Low,
    }
}

impl Gpio for RppalGpio {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> GpioResult<()> {
        // Dropping a previous handle for the same pin releases it first.
        self.pins.remove(&pin);
        let raw = self
            .gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open pin {pin}: {e}")))?;
        let handle = match mode {
            PinMode::Input => Pin::Input(raw.into_input()),
            PinMode::InputPullDown => Pin::Input(raw.into_input_pulldown()),
            PinMode::Output(Level::Low) => Pin::Output(raw.into_output_low()),
            PinMode::Output(Level::High) => Pin::Output(raw.into_output_high()),
        };
        debug!(pin, ?mode, "gpio pin configured");
        self.pins.insert(pin, handle);
        Ok(())
    }

    fn read_digital(&mut self, pin: u8) -> GpioResult<Level> {
        match self.pins.get(&pin) {
            Some(Pin::Input(p)) => Ok(from_rppal(p.read())),
            Some(Pin::Output(_)) => Err(HwError::WrongMode {
                pin,
                expected: "input",
            }
            .into()),
            None => Err(HwError::UnknownPin(pin).into()),
        }
    }

    fn write_digital(&mut self, pin: u8, level: Level) -> GpioResult<()> {
        match self.pins.get_mut(&pin) {
            Some(Pin::Output(p)) => {
                p.write(to_rppal(level));
                Ok(())
            }
            Some(Pin::Input(_)) => Err(HwError::WrongMode {
                pin,
                expected: "output",
            }
            .into()),
            None => Err(HwError::UnknownPin(pin).into()),
        }
    }
}
