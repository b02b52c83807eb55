use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("pin {0} has not been configured")]
    UnknownPin(u8),
    #[error("pin {pin} is not configured as {expected}")]
    WrongMode { pin: u8, expected: &'static str },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
