//! Geometry error types.

use thiserror::Error;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Layer number outside the chamber.
    #[error("layer {layer} out of range [1, {nlayers}]")]
    LayerOutOfRange { layer: u32, nlayers: u32 },

    /// Phi cell index outside the layer.
    #[error("phi cell {nphi} out of range for layer {layer} with {ncells} cells")]
    CellOutOfRange { layer: u32, nphi: u32, ncells: u32 },

    /// Wire direction with zero length.
    #[error("degenerate wire direction: {0}")]
    DegenerateWire(String),

    /// Invalid detector parameter.
    #[error("invalid detector parameter: {0}")]
    InvalidParameter(String),

    /// Cell identifier could not be decoded.
    #[error("cell id error: {0}")]
    InvalidCellId(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] dchdigi_core::Error),
}
