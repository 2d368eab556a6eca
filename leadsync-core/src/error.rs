//! Error types for leadsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from checkpoint store operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Underlying I/O failure on a path that exists but cannot be used.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("checkpoint JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`CheckpointError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CheckpointError {
    CheckpointError::Io {
        path: path.into(),
        source,
    }
}
