//! # leadsync-sync
//!
//! Resumable one-way contact migration.
//!
//! Build an [`Orchestrator`] from a [`Direction`](leadsync_core::Direction),
//! the three store [`Capabilities`] and a
//! [`CheckpointStore`](leadsync_core::CheckpointStore), then call
//! [`Orchestrator::run`].

pub mod capability;
pub mod error;
pub mod orchestrator;

pub use capability::{Capabilities, CreateOutcome, DedupOracle, MatchKey, SourceReader, TargetWriter};
pub use error::{BoxError, SyncError};
pub use orchestrator::{CheckpointWrite, Orchestrator, RunOptions, RunOutcome, RunReport};
