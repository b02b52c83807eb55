use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GarageError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("controller has shut down")]
    Shutdown,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing gpio")]
    MissingGpio,
    #[error("missing hub")]
    MissingHub,
    #[error("missing controller config")]
    MissingConfig,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
