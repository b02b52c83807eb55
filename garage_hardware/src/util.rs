use std::time::Duration;

use garage_traits::{Clock, Gpio, GpioResult, Level};

/// Two-phase button press: drive `pin` high for `hold`, release it, then
/// wait `hold` again so the relay settles before anything else happens.
///
/// Blocks the calling thread through `clock`. The controller uses its own
/// timer-driven version; this one is for one-off presses from the CLI.
pub fn pulse(
    gpio: &mut impl Gpio,
    pin: u8,
    hold: Duration,
    clock: &impl Clock,
) -> GpioResult<()> {
    gpio.write_digital(pin, Level::High)?;
    clock.sleep(hold);
    let released = gpio.write_digital(pin, Level::Low);
    clock.sleep(hold);
    released
}
