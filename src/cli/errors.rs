use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Mask shape given without a mask path: --{flag}")]
    ShapeWithoutMask { flag: &'static str },

    #[error("Failed to write report {path:?}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: endocrop::Error,
    },

    #[error(transparent)]
    Endocrop(#[from] endocrop::Error),
}
