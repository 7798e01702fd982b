use portaria_hardware::HardwareError;
use thiserror::Error;

/// Errors that end an access cycle early.
///
/// Denials and transport failures are not errors; they are ordinary
/// cycle outcomes. These are the failures [`run`](crate::AccessController::run)
/// logs before resetting to idle.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Core(#[from] portaria_core::Error),

    #[error("Device failure: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Door supervision failed: {0}")]
    Supervision(#[source] HardwareError),

    #[error("Invalid controller configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
