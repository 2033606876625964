//! Error types for dchdigi-core.

use thiserror::Error;

/// Result type alias for dchdigi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for dchdigi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Vector with zero (or non-finite) length where a direction is required.
    #[error("cannot normalize degenerate vector ({x}, {y}, {z})")]
    DegenerateVector { x: f64, y: f64, z: f64 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Calibration data error.
    #[error("calibration error: {0}")]
    CalibrationError(String),
}
