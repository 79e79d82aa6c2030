//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Setup errors (bad roots, mask assets, configuration) abort a run; the
//! per-image variants are captured by the worker pool against a single task.
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ImageShape;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source is not a directory: {path:?}")]
    NotADirectory { path: PathBuf },

    #[error("Destination exists and is not a directory: {path:?}")]
    DestinationConflict { path: PathBuf },

    #[error("Source and destination are the same directory: {path:?}")]
    SameRoots { path: PathBuf },

    #[error("Failed to load mask {path:?}: {reason}")]
    MaskLoad { path: PathBuf, reason: String },

    #[error("Mask {path:?} has shape {actual}, expected {expected}")]
    MaskShapeMismatch {
        path: PathBuf,
        expected: ImageShape,
        actual: ImageShape,
    },

    #[error("Failed to decode image {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Autocrop found no subject (no contour above threshold)")]
    AutocropNoSubject,

    #[error("Failed to encode image {path:?}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("{failed} of {total} image(s) failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Task panicked: {0}")]
    Panic(String),
}

impl Error {
    pub fn decode<E: std::fmt::Display>(path: impl Into<PathBuf>, e: E) -> Self {
        Error::Decode {
            path: path.into(),
            reason: e.to_string(),
        }
    }

    pub fn encode<E: std::fmt::Display>(path: impl Into<PathBuf>, e: E) -> Self {
        Error::Encode {
            path: path.into(),
            reason: e.to_string(),
        }
    }
}
