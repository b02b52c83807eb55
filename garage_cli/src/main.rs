mod cli;
mod error_fmt;
mod gpio;
mod jsonl;
mod logging;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr};
use garage_config::Config;
use garage_core::{ControllerConfig, DoorController, SensorReader, runner};
use garage_traits::{Gpio, Level, MonotonicClock, PinMode};
use serde_json::json;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::gpio::hw;
use crate::jsonl::{AccessoryInfo, JsonLinesHub, SharedOut};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            error_fmt::exit_code_for_error(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<()> {
    let text = std::fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("read config file {}", cli.config.display()))?;
    let raw = garage_config::parse_raw(&text)?;
    // Logging comes up before key validation so missing keys are logged.
    logging::init(cli.json, cli.log_level.as_deref(), &raw.logging)?;
    let cfg = Config::from_raw(raw)?;

    match cli.cmd {
        Commands::CheckConfig => check_config(cli, &cfg),
        Commands::Status => status(&cfg, cli.json),
        Commands::Press => press(&cfg, cli.json),
        Commands::Run => serve(&cfg),
    }
}

fn check_config(cli: &Cli, cfg: &Config) -> Result<()> {
    let v = json!({
        "name": cfg.name,
        "buttonPin": cfg.button_pin,
        "openSensorPin": cfg.open_sensor_pin,
        "closedSensorPin": cfg.closed_sensor_pin,
        "durationOfMovement": cfg.duration_of_movement_ms,
        "sensorPowerPin": cfg.sensor_power_pin,
        "pollingInterval": cfg.polling_interval_ms,
        "durationToPressButton": cfg.duration_to_press_button_ms,
        "manufacturer": cfg.accessory.manufacturer,
        "model": cfg.accessory.model,
        "serialNumber": cfg.accessory.serial_number,
    });
    if cli.json {
        println!("{v}");
        return Ok(());
    }
    println!("config ok: {}", cli.config.display());
    if let Some(obj) = v.as_object() {
        for (k, val) in obj {
            println!("  {k} = {val}");
        }
    }
    Ok(())
}

fn status(cfg: &Config, json_out: bool) -> Result<()> {
    let mut gpio = gpio::open(cfg)?;
    let reader = SensorReader::new(
        cfg.open_sensor_pin,
        cfg.closed_sensor_pin,
        cfg.sensor_power_pin,
    );
    hw(reader.configure(&mut gpio), "configure sensor pins")?;
    let snap = hw(reader.snapshot(&mut gpio), "read sensors")?;
    let state = hw(reader.read(&mut gpio), "read sensors")?;
    hw(reader.power_down(&mut gpio), "power down sensors")?;

    let level = |b: bool| if b { "high" } else { "low" };
    if json_out {
        println!(
            "{}",
            json!({
                "state": state.to_string(),
                "open_sensor": snap.open,
                "closed_sensor": snap.closed,
            })
        );
    } else {
        println!(
            "{state} (open sensor: {}, closed sensor: {})",
            level(snap.open),
            level(snap.closed)
        );
    }
    Ok(())
}

fn press(cfg: &Config, json_out: bool) -> Result<()> {
    let mut gpio = gpio::open(cfg)?;
    hw(
        gpio.configure_pin(cfg.button_pin, PinMode::Output(Level::Low)),
        "configure button pin",
    )?;
    let hold = Duration::from_millis(cfg.duration_to_press_button_ms);
    tracing::info!(pin = cfg.button_pin, hold_ms = cfg.duration_to_press_button_ms, "pressing button");
    hw(
        garage_hardware::util::pulse(&mut gpio, cfg.button_pin, hold, &MonotonicClock::new()),
        "press button",
    )?;
    if json_out {
        println!(
            "{}",
            json!({ "pressed": true, "pin": cfg.button_pin, "hold_ms": cfg.duration_to_press_button_ms })
        );
    } else {
        println!("button pressed (pin {}, {} ms)", cfg.button_pin, cfg.duration_to_press_button_ms);
    }
    Ok(())
}

fn serve(cfg: &Config) -> Result<()> {
    let gpio = gpio::open(cfg)?;
    let out: SharedOut = Arc::new(Mutex::new(std::io::stdout()));

    let controller = DoorController::builder()
        .gpio(gpio)
        .hub(JsonLinesHub::new(out.clone()))
        .config(ControllerConfig::from(cfg))
        .clock(MonotonicClock::new())
        .try_build()?;
    let (handle, join) = runner::spawn(controller);

    let on_signal = handle.clone();
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received; shutting down");
        on_signal.shutdown();
    })
    .wrap_err("install Ctrl-C handler")?;

    let info = AccessoryInfo::from(cfg);
    let input = handle.clone();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        if let Err(e) = jsonl::serve(&input, &info, stdin.lock(), &out) {
            tracing::warn!(error = %e, "hub input failed");
        }
        tracing::info!("hub input closed; shutting down");
        input.shutdown();
    });
    drop(handle);

    let controller = join
        .join()
        .map_err(|_| eyre::eyre!("controller thread panicked"))??;
    tracing::info!(state = %controller.current_state(), "garage-pi stopped");
    Ok(())
}
