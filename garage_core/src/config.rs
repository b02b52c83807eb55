//! Runtime timings and pin assignments for one door.

use std::time::Duration;

use crate::debounce::DEFAULT_CAPACITY;

/// The grace period after a press from an endpoint is this fraction of the
/// movement duration.
pub const GRACE_DIVISOR: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub name: String,
    pub button_pin: u8,
    pub open_sensor_pin: u8,
    pub closed_sensor_pin: u8,
    pub sensor_power_pin: Option<u8>,
    pub polling_interval: Duration,
    pub press_duration: Duration,
    pub movement_duration: Duration,
    pub debounce_capacity: usize,
}

impl ControllerConfig {
    /// Time after a press from an endpoint during which polling is ignored.
    pub fn grace_period(&self) -> Duration {
        self.movement_duration / GRACE_DIVISOR
    }

    /// Polling interval, never shorter than 1 ms so a zero setting cannot
    /// spin the timeline.
    pub fn effective_polling_interval(&self) -> Duration {
        self.polling_interval.max(Duration::from_millis(1))
    }
}

impl From<&garage_config::Config> for ControllerConfig {
    fn from(c: &garage_config::Config) -> Self {
        Self {
            name: c.name.clone(),
            button_pin: c.button_pin,
            open_sensor_pin: c.open_sensor_pin,
            closed_sensor_pin: c.closed_sensor_pin,
            sensor_power_pin: c.sensor_power_pin,
            polling_interval: Duration::from_millis(c.polling_interval_ms),
            press_duration: Duration::from_millis(c.duration_to_press_button_ms),
            movement_duration: Duration::from_millis(c.duration_of_movement_ms),
            debounce_capacity: DEFAULT_CAPACITY,
        }
    }
}
