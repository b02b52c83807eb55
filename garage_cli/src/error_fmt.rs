//! Human-readable error descriptions and structured JSON error formatting.

use garage_config::{ConfigError, REQUIRED_KEYS};
use garage_core::{BuildError, GarageError};
use serde_json::json;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<ConfigError>() {
        return match ce {
            ConfigError::MissingKeys(keys) => format!(
                "What happened: The config file is missing required keys: {}.\nLikely causes: A new or hand-edited config, or a key spelled differently (keys are camelCase).\nHow to fix: Add every required key ({}) and rerun.",
                keys.join(", "),
                REQUIRED_KEYS.join(", ")
            ),
            ConfigError::Parse(e) => format!(
                "What happened: The config file could not be parsed ({e}).\nLikely causes: A TOML syntax error or a value of the wrong type, such as a quoted pin number.\nHow to fix: Fix the line mentioned above, then run `garage-pi check-config`."
            ),
        };
    }

    if let Some(ge) = err.downcast_ref::<GarageError>() {
        return match ge {
            GarageError::Hardware(_) | GarageError::HardwareFault(_) => format!(
                "What happened: GPIO access failed ({ge}).\nLikely causes: Not running on a Raspberry Pi, no permission for /dev/gpiomem, or a pin already claimed by another process.\nHow to fix: Run as a user in the gpio group and check that no other service holds the pins. Original: {err}"
            ),
            GarageError::Config(msg) => format!(
                "What happened: The pins could not be set up ({msg}).\nLikely causes: A pin number that does not exist on this board, or the same pin used twice.\nHow to fix: Check buttonPin, openSensorPin, closedSensorPin and sensorPowerPin in the config."
            ),
            GarageError::Shutdown => "What happened: The controller stopped before answering.\nLikely causes: Ctrl-C or the hub input closed.\nHow to fix: Restart `garage-pi run`.".to_string(),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: The controller could not be assembled ({be}).\nLikely causes: An internal wiring bug.\nHow to fix: Re-run with --log-level=debug and report the output."
        );
    }

    // String-based heuristics for errors coming from file access
    let msg = err.to_string();
    if msg.contains("read config file") {
        let cause = err
            .source()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        return format!(
            "What happened: {msg}{cause}.\nLikely causes: Wrong --config path or missing read permission.\nHow to fix: Pass --config with the path to your garage_pi.toml."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: missing config keys 3, hardware init 4, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ConfigError::MissingKeys(_)) = err.downcast_ref::<ConfigError>() {
        return 3;
    }
    match err.downcast_ref::<GarageError>() {
        Some(GarageError::Shutdown) | None => 1,
        Some(_) => 4,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if let Some(ce) = err.downcast_ref::<ConfigError>() {
        return match ce {
            ConfigError::MissingKeys(_) => "MissingKeys",
            ConfigError::Parse(_) => "ConfigParse",
        };
    }
    match err.downcast_ref::<GarageError>() {
        Some(GarageError::Hardware(_) | GarageError::HardwareFault(_)) => "Hardware",
        Some(GarageError::Config(_)) => "PinSetup",
        Some(GarageError::Shutdown) => "Shutdown",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let msg = humanize(err);
    if let Some(ConfigError::MissingKeys(keys)) = err.downcast_ref::<ConfigError>() {
        return json!({ "reason": reason_name(err), "missing_keys": keys, "message": msg })
            .to_string();
    }
    json!({ "reason": reason_name(err), "message": msg }).to_string()
}
