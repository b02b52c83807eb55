//! JSON-lines hub binding on stdin/stdout.
//!
//! One request object per input line, one response per request. State
//! pushes from the controller are written as unsolicited `event` lines on
//! the same output, so the writer is shared behind a mutex.

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use eyre::{Result, WrapErr};
use garage_config::Config;
use garage_core::{DoorState, GarageError, HubHandle, HubNotifier, RequestOutcome, TargetState};
use serde::Deserialize;
use serde_json::{Value, json};

pub type SharedOut = Arc<Mutex<dyn Write + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArg {
    Open,
    Closed,
}

impl From<TargetArg> for TargetState {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Open => TargetState::Open,
            TargetArg::Closed => TargetState::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GetCurrent,
    GetTarget,
    SetTarget { value: TargetArg },
    Info,
}

/// Accessory information answered to `info`.
#[derive(Debug, Clone)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl From<&Config> for AccessoryInfo {
    fn from(cfg: &Config) -> Self {
        Self {
            name: cfg.name.clone(),
            manufacturer: cfg.accessory.manufacturer.clone(),
            model: cfg.accessory.model.clone(),
            serial_number: cfg.accessory.serial_number.clone(),
        }
    }
}

fn emit(out: &SharedOut, v: &Value) {
    let Ok(mut w) = out.lock() else {
        tracing::warn!("hub output poisoned; dropping line");
        return;
    };
    if let Err(e) = writeln!(w, "{v}").and_then(|()| w.flush()) {
        tracing::warn!(error = %e, "failed to write hub line");
    }
}

fn current_json(s: DoorState) -> Value {
    json!({ "value": s.as_str(), "code": s.hap_code() })
}

/// Pushes controller state changes as `event` lines.
pub struct JsonLinesHub {
    out: SharedOut,
}

impl JsonLinesHub {
    pub fn new(out: SharedOut) -> Self {
        Self { out }
    }
}

impl HubNotifier for JsonLinesHub {
    fn push_current_state(&mut self, state: DoorState) {
        emit(
            &self.out,
            &json!({ "event": "current_state", "value": state.as_str(), "code": state.hap_code() }),
        );
    }

    fn push_target_state(&mut self, target: TargetState) {
        emit(
            &self.out,
            &json!({ "event": "target_state", "value": target.as_str(), "code": target.hap_code() }),
        );
    }
}

fn respond(handle: &HubHandle, info: &AccessoryInfo, req: Request) -> Result<Value> {
    Ok(match req {
        Request::GetCurrent => {
            let mut v = current_json(handle.get_current_state()?);
            v["op"] = json!("get_current");
            v
        }
        Request::GetTarget => {
            let t = handle.get_target_state()?;
            json!({ "op": "get_target", "value": t.as_str(), "code": t.hap_code() })
        }
        Request::SetTarget { value } => {
            let target = TargetState::from(value);
            let outcome = handle
                .set_target_state(target)?
                .recv()
                .map_err(|_| eyre::Report::new(GarageError::Shutdown))?;
            let (result, state) = match outcome {
                RequestOutcome::AlreadySatisfied { state } => ("already_satisfied", state),
                RequestOutcome::Pressed { to, .. } => ("pressed", to),
            };
            json!({ "op": "set_target", "value": target.as_str(), "result": result, "state": state.as_str() })
        }
        Request::Info => json!({
            "op": "info",
            "name": info.name,
            "manufacturer": info.manufacturer,
            "model": info.model,
            "serial_number": info.serial_number,
        }),
    })
}

/// Answer requests from `input` until it closes or the controller stops.
pub fn serve(
    handle: &HubHandle,
    info: &AccessoryInfo,
    input: impl BufRead,
    out: &SharedOut,
) -> Result<()> {
    for line in input.lines() {
        let line = line.wrap_err("read hub request")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let req = match serde_json::from_str::<Request>(line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, line, "bad hub request");
                emit(out, &json!({ "error": e.to_string() }));
                continue;
            }
        };
        tracing::debug!(?req, "hub request");
        match respond(handle, info, req) {
            Ok(v) => emit(out, &v),
            Err(e) if matches!(e.downcast_ref::<GarageError>(), Some(GarageError::Shutdown)) => {
                tracing::debug!("controller stopped; closing hub input");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
