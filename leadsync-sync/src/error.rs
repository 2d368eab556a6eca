//! Error types for leadsync-sync.

use thiserror::Error;

use leadsync_core::{CheckpointError, RecordId};

/// Boxed error reported by an external store client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every error that aborts a migration run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading the checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// The target store refused to create a record.
    #[error("contact creation failed for {record_id}: {}", .messages.join(","))]
    WriteRejected {
        record_id: RecordId,
        messages: Vec<String>,
    },

    /// Fetch, authentication or dedup query failed.
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl SyncError {
    /// Convenience constructor for [`SyncError::Transport`].
    pub fn transport(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        SyncError::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    /// `true` when the target store rejected a write, as opposed to the
    /// run failing to reach a store at all.
    pub fn is_write_rejected(&self) -> bool {
        matches!(self, SyncError::WriteRejected { .. })
    }
}
