//! Error types for the simulator.

use fieldcast_core::DeviceId;
use thiserror::Error;

/// Simulator error types
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A device id was used that the topology does not contain
    #[error("unknown device: {0}")]
    UnknownDevice(DeviceId),

    /// Configuration could not be parsed
    #[error("invalid config: {0}")]
    Config(String),
}

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;

impl SimulatorError {
    /// Create a config error
    pub fn config(err: impl std::fmt::Display) -> Self {
        Self::Config(err.to_string())
    }
}
