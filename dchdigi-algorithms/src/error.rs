//! Digitization error types.

use thiserror::Error;

/// Result type for digitization.
pub type Result<T> = std::result::Result<T, Error>;

/// Digitization error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid algorithm configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Processing of one event was aborted.
    #[error("run {run} event {event}, hit {hit_index}: {source}")]
    EventAborted {
        /// Run number.
        run: u32,
        /// Event number.
        event: u32,
        /// Index of the failing hit.
        hit_index: usize,
        /// Underlying failure.
        #[source]
        source: Box<Error>,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Geometry error.
    #[error("geometry error: {0}")]
    GeometryError(#[from] dchdigi_geometry::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] dchdigi_core::Error),
}
