//! Error types for the snapshot pipeline

use thiserror::Error;

/// Result type alias for snapshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while snapshotting text
#[derive(Error, Debug)]
pub enum Error {
    /// The snapshot target is neither a usable node nor a valid selector
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A selector matched nothing in the host document
    #[error("No element matches selector: {0}")]
    NotFound(String),

    /// Unrecognized output format
    #[error("Invalid format: {0} (expected one of svg, canvas, img, blob)")]
    InvalidFormat(String),

    /// Geometry could not be measured (detached, hidden or zero-size node).
    /// The extraction pipeline recovers from this locally.
    #[error("Measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// The rasterizer failed to decode or render the vector document
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// Malformed options document
    #[error("Invalid options: {0}")]
    Options(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Options(err.to_string())
    }
}
