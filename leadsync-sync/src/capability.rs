//! Store capabilities consumed by the orchestrator.
//!
//! Every call blocks until the store answers. Implementations report
//! unreachable stores, failed logins and malformed replies as
//! [`SyncError::Transport`]; a store that answers but refuses a record
//! returns [`CreateOutcome::Rejected`].

use leadsync_core::{Contact, MatchRule, RecordId, SourceRecord};

use crate::error::SyncError;

/// Lists every record of the source store.
pub trait SourceReader {
    /// One fetch, in the store's stable order. A fresh call re-reads
    /// everything.
    fn fetch_all(&self) -> Result<Vec<SourceRecord>, SyncError>;
}

/// Candidate fields plus the rule used to compare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchKey<'a> {
    pub contact: &'a Contact,
    pub rule: MatchRule,
}

/// Answers whether the target store already holds an equivalent record.
pub trait DedupOracle {
    fn exists(&self, key: &MatchKey<'_>) -> Result<bool, SyncError>;
}

/// Outcome of a single create call that reached the target store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(RecordId),
    /// Human-readable reasons given by the store; never empty.
    Rejected(Vec<String>),
}

/// Creates records in the target store.
pub trait TargetWriter {
    fn create(&self, contact: &Contact) -> Result<CreateOutcome, SyncError>;
}

/// The direction-specific bindings handed to an orchestrator.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub source: &'a dyn SourceReader,
    pub oracle: &'a dyn DedupOracle,
    pub writer: &'a dyn TargetWriter,
}
