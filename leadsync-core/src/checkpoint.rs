//! Checkpoint store: the last attempted record id for one direction.
//!
//! Persists a `{"rowId": "<id>"}` JSON document, by default at
//! `<home>/.leadsync/checkpoints/<direction file>.json`.
//! Writes go to `<path>.tmp` and are renamed into place.
//!
//! Path helpers take the home directory explicitly; callers resolve it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{io_err, CheckpointError};
use crate::types::RecordId;

/// On-disk checkpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub row_id: RecordId,
}

/// `<home>/.leadsync/checkpoints/`: pure, no I/O.
pub fn checkpoint_dir_at(home: &Path) -> PathBuf {
    home.join(".leadsync").join("checkpoints")
}

/// `<home>/.leadsync/checkpoints/<file>` for `direction`: pure, no I/O.
pub fn checkpoint_path_at(home: &Path, direction: Direction) -> PathBuf {
    checkpoint_dir_at(home).join(direction.checkpoint_file_name())
}

/// Single-slot store backed by one file.
///
/// Two processes writing the same file are not coordinated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `direction` inside `dir`.
    pub fn in_dir(dir: &Path, direction: Direction) -> Self {
        Self::new(dir.join(direction.checkpoint_file_name()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored record id.
    ///
    /// Returns `None` if the file does not exist, does not hold a
    /// `{rowId: string}` object, or holds an empty id. Any other I/O failure
    /// is returned as an error.
    pub fn load(&self) -> Result<Option<RecordId>, CheckpointError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&self.path, e)),
        };
        match serde_json::from_slice::<Checkpoint>(&bytes) {
            Ok(checkpoint) if checkpoint.row_id.as_str().is_empty() => Ok(None),
            Ok(checkpoint) => Ok(Some(checkpoint.row_id)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable checkpoint"
                );
                Ok(None)
            }
        }
    }

    /// Overwrite the stored record id.
    pub fn save(&self, row_id: &RecordId) -> Result<(), CheckpointError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid checkpoint path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string(&Checkpoint {
            row_id: row_id.clone(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        Ok(())
    }

    /// Remove the checkpoint file. Returns `false` if there was none.
    pub fn clear(&self) -> Result<bool, CheckpointError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(&self.path, e)),
        }
    }
}
