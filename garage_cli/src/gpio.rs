//! Pin backend selection: rppal with `--features hardware` on Linux,
//! otherwise simulated pins seeded from `GARAGE_SIM_SENSORS`.

use eyre::{Result, WrapErr};
use garage_config::Config;
use garage_core::hw_error::map_hw_error;
use garage_traits::{Gpio, GpioResult};

pub type BoxGpio = Box<dyn Gpio + Send>;

/// Map a trait-boundary error to a typed report with some context.
pub fn hw<T>(r: GpioResult<T>, what: &'static str) -> Result<T> {
    r.map_err(|e| eyre::Report::new(map_hw_error(&*e)).wrap_err(what))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open(_cfg: &Config) -> Result<BoxGpio> {
    let gpio = garage_hardware::RppalGpio::new()
        .map_err(|e| eyre::Report::new(map_hw_error(&e)))
        .wrap_err("open gpio")?;
    tracing::info!("using rppal gpio");
    Ok(Box::new(gpio))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn open(cfg: &Config) -> Result<BoxGpio> {
    let seed = std::env::var("GARAGE_SIM_SENSORS").unwrap_or_else(|_| "closed".into());
    let gpio = simulated(cfg, &seed).wrap_err("open simulated gpio")?;
    tracing::info!(sensors = %seed, "using simulated gpio");
    Ok(Box::new(gpio))
}

/// Simulated pins with the sensors driven as `seed` describes:
/// `open`, `closed`, `none` or `both`.
#[cfg_attr(all(feature = "hardware", target_os = "linux"), allow(dead_code))]
pub fn simulated(cfg: &Config, seed: &str) -> Result<garage_hardware::SimulatedGpio> {
    use garage_core::GarageError;
    use garage_traits::Level;

    let (open, closed) = match seed.trim().to_ascii_lowercase().as_str() {
        "open" => (true, false),
        "closed" => (false, true),
        "none" => (false, false),
        "both" => (true, true),
        other => {
            return Err(eyre::Report::new(GarageError::Config(format!(
                "GARAGE_SIM_SENSORS must be open, closed, none or both (got '{other}')"
            ))));
        }
    };
    let gpio = garage_hardware::SimulatedGpio::new();
    gpio.set_input(cfg.open_sensor_pin, Level::from(open));
    gpio.set_input(cfg.closed_sensor_pin, Level::from(closed));
    Ok(gpio)
}
