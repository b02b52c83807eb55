//! Pin backends for the garage door controller.
//!
//! `SimulatedGpio` is always available; `RppalGpio` drives real Raspberry Pi
//! pins and is compiled only with the `hardware` feature on Linux.

pub mod error;
pub mod sim;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod rppal_gpio;

pub use error::HwError;
pub use sim::SimulatedGpio;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use rppal_gpio::RppalGpio;
