//! Door states and the fixed button-press transition table.

use std::fmt;
use std::str::FromStr;

/// Everything the controller can believe about the door.
///
/// `Stopped` covers "neither sensor asserted and no move known to be in
/// progress": mid-travel, halted, or unpowered sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorState {
    Open,
    Closed,
    Opening,
    Closing,
    Stopped,
}

impl DoorState {
    pub const ALL: [DoorState; 5] = [
        DoorState::Open,
        DoorState::Closed,
        DoorState::Opening,
        DoorState::Closing,
        DoorState::Stopped,
    ];

    /// State the door moves to when the button is pressed from `self`.
    ///
    /// * When open -> closing
    /// * When closed -> opening
    /// * When opening -> stopped
    /// * When closing -> opening
    /// * When stopped -> closing
    #[inline]
    pub const fn after_press(self) -> DoorState {
        match self {
            DoorState::Open => DoorState::Closing,
            DoorState::Closed => DoorState::Opening,
            DoorState::Opening => DoorState::Stopped,
            DoorState::Closing => DoorState::Opening,
            DoorState::Stopped => DoorState::Closing,
        }
    }

    /// Fully at rest against a physical limit.
    #[inline]
    pub const fn is_endpoint(self) -> bool {
        matches!(self, DoorState::Open | DoorState::Closed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Closed => "closed",
            DoorState::Opening => "opening",
            DoorState::Closing => "closing",
            DoorState::Stopped => "stopped",
        }
    }

    /// HomeKit `CurrentDoorState` characteristic value.
    pub const fn hap_code(self) -> u8 {
        match self {
            DoorState::Open => 0,
            DoorState::Closed => 1,
            DoorState::Opening => 2,
            DoorState::Closing => 3,
            DoorState::Stopped => 4,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The last commanded endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    Open,
    Closed,
}

impl TargetState {
    /// Target implied by a stored door state: closed or closing targets
    /// `Closed`, everything else targets `Open`.
    #[inline]
    pub const fn derived_from(state: DoorState) -> TargetState {
        match state {
            DoorState::Closed | DoorState::Closing => TargetState::Closed,
            _ => TargetState::Open,
        }
    }

    /// True when the door is at this target or already heading there.
    #[inline]
    pub const fn is_satisfied_by(self, state: DoorState) -> bool {
        match self {
            TargetState::Closed => matches!(state, DoorState::Closed | DoorState::Closing),
            TargetState::Open => matches!(state, DoorState::Open | DoorState::Opening),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TargetState::Open => "open",
            TargetState::Closed => "closed",
        }
    }

    /// HomeKit `TargetDoorState` characteristic value.
    pub const fn hap_code(self) -> u8 {
        match self {
            TargetState::Open => 0,
            TargetState::Closed => 1,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetState {
    type Err = String;

    /// Accepts `open`/`closed` (any case) or the HomeKit codes `0`/`1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "0" => Ok(TargetState::Open),
            "closed" | "close" | "1" => Ok(TargetState::Closed),
            other => Err(format!("unknown target state '{other}'")),
        }
    }
}

impl From<TargetState> for DoorState {
    fn from(t: TargetState) -> Self {
        match t {
            TargetState::Open => DoorState::Open,
            TargetState::Closed => DoorState::Closed,
        }
    }
}

/// What the two position sensors alone say right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculatedState {
    Open,
    Closed,
    Stopped,
}

impl From<CalculatedState> for DoorState {
    fn from(c: CalculatedState) -> Self {
        match c {
            CalculatedState::Open => DoorState::Open,
            CalculatedState::Closed => DoorState::Closed,
            CalculatedState::Stopped => DoorState::Stopped,
        }
    }
}

impl PartialEq<DoorState> for CalculatedState {
    fn eq(&self, other: &DoorState) -> bool {
        DoorState::from(*self) == *other
    }
}

impl fmt::Display for CalculatedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DoorState::from(*self).fmt(f)
    }
}
