//! Error types shared by every pipeline stage.

use std::io;
use std::path::PathBuf;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while simulating, exporting or analyzing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid connectivity graph: {0}")]
    InvalidGraph(String),

    #[error("Reference index {index} out of range for a trajectory of {steps} steps")]
    ReferenceIndexOutOfRange { index: i64, steps: usize },

    /// A line of a persisted trajectory that is not a finite, non-negative number.
    #[error("Malformed activity value at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("I/O error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
