#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the garage door controller.
//!
//! - The TOML file uses the accessory's camelCase key names (`buttonPin`,
//!   `durationOfMovement`, ...). Unknown keys are ignored.
//! - Required keys are deserialized as optional first so that every missing
//!   key can be reported at once; `Config::from_raw` then refuses to build.
//! - Presence is the only check. Ranges and timings are taken as given.
use std::path::Path;

use eyre::WrapErr;
use serde::Deserialize;
use thiserror::Error;

/// Default sensor polling interval in milliseconds.
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 250;
/// Default time the button relay is held closed, in milliseconds.
pub const DEFAULT_DURATION_TO_PRESS_BUTTON_MS: u64 = 300;

/// Keys that must be present, in the order they are reported.
pub const REQUIRED_KEYS: [&str; 5] = [
    "name",
    "buttonPin",
    "openSensorPin",
    "closedSensorPin",
    "durationOfMovement",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing keys in config: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// The file as written, before required keys are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub name: Option<String>,
    pub button_pin: Option<u8>,
    pub open_sensor_pin: Option<u8>,
    pub closed_sensor_pin: Option<u8>,
    pub duration_of_movement: Option<u64>,
    pub sensor_power_pin: Option<u8>,
    pub polling_interval: Option<u64>,
    pub duration_to_press_button: Option<u64>,
    #[serde(default)]
    pub information: Accessory,
    #[serde(default)]
    pub logging: Logging,
}

/// Accessory information published to the hub.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Accessory {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl Default for Accessory {
    fn default() -> Self {
        Self {
            manufacturer: "Eric Ferreira".into(),
            model: "Garage Pi Opener".into(),
            serial_number: "000-000-001".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Never,
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    pub rotation: Rotation,
}

/// Validated, immutable configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub button_pin: u8,
    pub open_sensor_pin: u8,
    pub closed_sensor_pin: u8,
    pub duration_of_movement_ms: u64,
    /// When set, this pin powers both sensors and is driven high at startup.
    pub sensor_power_pin: Option<u8>,
    pub polling_interval_ms: u64,
    pub duration_to_press_button_ms: u64,
    pub accessory: Accessory,
    pub logging: Logging,
}

/// Parse TOML without checking for required keys.
pub fn parse_raw(s: &str) -> Result<RawConfig, ConfigError> {
    Ok(toml::from_str::<RawConfig>(s)?)
}

/// Parse TOML and check that every required key is present.
pub fn load_toml(s: &str) -> Result<Config, ConfigError> {
    Config::from_raw(parse_raw(s)?)
}

/// Read and load a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config file {}", path.display()))?;
    Ok(load_toml(&text)?)
}

impl RawConfig {
    /// Required keys absent from this file, in reporting order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.name.is_some(),
            self.button_pin.is_some(),
            self.open_sensor_pin.is_some(),
            self.closed_sensor_pin.is_some(),
            self.duration_of_movement.is_some(),
        ];
        REQUIRED_KEYS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(key, _)| *key)
            .collect()
    }
}

impl Config {
    /// Fill defaults and refuse to build when required keys are missing.
    ///
    /// Every missing key gets its own error line before the combined error
    /// is returned.
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let missing = raw.missing_keys();
        if !missing.is_empty() {
            for key in &missing {
                tracing::error!(key, "The \"{key}\" key is not set in the config file");
            }
            return Err(ConfigError::MissingKeys(missing));
        }

        let RawConfig {
            name: Some(name),
            button_pin: Some(button_pin),
            open_sensor_pin: Some(open_sensor_pin),
            closed_sensor_pin: Some(closed_sensor_pin),
            duration_of_movement: Some(duration_of_movement_ms),
            sensor_power_pin,
            polling_interval,
            duration_to_press_button,
            information: accessory,
            logging,
        } = raw
        else {
            // missing_keys() covers every required field
            return Err(ConfigError::MissingKeys(REQUIRED_KEYS.to_vec()));
        };

        Ok(Self {
            name,
            button_pin,
            open_sensor_pin,
            closed_sensor_pin,
            duration_of_movement_ms,
            sensor_power_pin,
            polling_interval_ms: polling_interval.unwrap_or(DEFAULT_POLLING_INTERVAL_MS),
            duration_to_press_button_ms: duration_to_press_button
                .unwrap_or(DEFAULT_DURATION_TO_PRESS_BUTTON_MS),
            accessory,
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "Garage Door"
buttonPin = 17
openSensorPin = 27
closedSensorPin = 22
durationOfMovement = 15000
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = load_toml(MINIMAL).expect("valid config");
        assert_eq!(cfg.name, "Garage Door");
        assert_eq!(cfg.button_pin, 17);
        assert_eq!(cfg.polling_interval_ms, DEFAULT_POLLING_INTERVAL_MS);
        assert_eq!(
            cfg.duration_to_press_button_ms,
            DEFAULT_DURATION_TO_PRESS_BUTTON_MS
        );
        assert_eq!(cfg.sensor_power_pin, None);
        assert_eq!(cfg.accessory, Accessory::default());
        assert_eq!(cfg.logging.rotation, Rotation::Never);
    }

    #[test]
    fn empty_file_reports_all_required_keys() {
        let raw = parse_raw("").unwrap();
        assert_eq!(raw.missing_keys(), REQUIRED_KEYS.to_vec());
    }

    #[test]
    fn homebridge_accessory_marker_is_ignored() {
        let text = format!("accessory = \"GaragePi\"\n{MINIMAL}");
        assert!(load_toml(&text).is_ok());
    }
}
