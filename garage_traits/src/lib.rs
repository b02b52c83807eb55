pub mod clock;
pub mod gpio;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use gpio::{Gpio, GpioResult, Level, PinMode};
