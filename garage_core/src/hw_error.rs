//! Maps `Box<dyn Error>` from the `Gpio` trait boundary to `GarageError`.
//!
//! With the `hardware-errors` feature, `garage_hardware::HwError` is
//! downcast for a precise mapping; anything else becomes
//! `GarageError::Hardware`.

use crate::error::GarageError;

pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> GarageError {
    #[cfg(feature = "hardware-errors")]
    {
        use garage_hardware::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::UnknownPin(_) | HwError::WrongMode { .. } => {
                    GarageError::Config(hw.to_string())
                }
                HwError::Io(_) => GarageError::Hardware(hw.to_string()),
                HwError::Gpio(_) => GarageError::HardwareFault(hw.to_string()),
            };
        }
    }

    GarageError::Hardware(e.to_string())
}

/// Convert a trait-boundary error into an `eyre::Report` carrying a typed
/// `GarageError`.
pub(crate) fn report(e: &(dyn std::error::Error + Send + Sync + 'static)) -> eyre::Report {
    eyre::Report::new(map_hw_error(e))
}
