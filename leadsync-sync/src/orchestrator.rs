//! Resumable migration loop.
//!
//! ## Run protocol
//!
//! 1. Load the checkpoint for the direction.
//! 2. Fetch every source record in one call.
//! 3. With a checkpoint, skip records until its id comes up; that record is
//!    processed again, not skipped.
//! 4. Per record: remember it as last attempted, extract and validate the
//!    contact, ask the dedup oracle, create it in the target.
//! 5. On completion, clear the checkpoint unless told to keep it.
//! 6. On the first error, save the last attempted id as the checkpoint and
//!    report the failure. Nothing is propagated to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;

use leadsync_core::{CheckpointStore, Direction, RecordId, SourceRecord};

use crate::capability::{Capabilities, CreateOutcome, MatchKey};
use crate::error::SyncError;

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

/// Tunables for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Remove the checkpoint after a run that processed every record.
    pub clear_checkpoint_on_success: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            clear_checkpoint_on_success: true,
        }
    }
}

/// What happened to the checkpoint when a run aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckpointWrite {
    Saved { record_id: RecordId },
    Failed { record_id: RecordId, error: String },
    /// The run failed before any record id was known.
    NothingToSave,
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Aborted {
        error: String,
        write_rejected: bool,
        checkpoint: CheckpointWrite,
    },
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub outcome: RunOutcome,
    /// Checkpoint the run started from, if any.
    pub resumed_from: Option<RecordId>,
    pub skipped_before_checkpoint: usize,
    pub attempted: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
    /// Ids assigned by the target store, in creation order.
    pub created: Vec<RecordId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn started(direction: Direction) -> Self {
        let now = Utc::now();
        Self {
            direction,
            outcome: RunOutcome::Completed,
            resumed_from: None,
            skipped_before_checkpoint: 0,
            attempted: 0,
            skipped_invalid: 0,
            skipped_duplicate: 0,
            created: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Skipping records until the checkpoint id comes up.
    Resuming,
    Streaming,
}

/// Drives one direction from source to target.
pub struct Orchestrator<'a> {
    direction: Direction,
    capabilities: Capabilities<'a>,
    checkpoint: CheckpointStore,
    options: RunOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        direction: Direction,
        capabilities: Capabilities<'a>,
        checkpoint: CheckpointStore,
        options: RunOptions,
    ) -> Self {
        Self {
            direction,
            capabilities,
            checkpoint,
            options,
        }
    }

    /// Run the migration to completion or to the first fatal error.
    pub fn run(&self) -> RunReport {
        let label = self.direction.label();
        let mut report = RunReport::started(self.direction);
        let mut last_attempted: Option<RecordId> = None;

        tracing::info!(direction = label, "migration started");

        match self.stream(&mut report, &mut last_attempted) {
            Ok(()) => {
                tracing::info!(
                    direction = label,
                    created = report.created.len(),
                    duplicates = report.skipped_duplicate,
                    invalid = report.skipped_invalid,
                    "migrated successfully!"
                );
                if self.options.clear_checkpoint_on_success {
                    self.clear_progress();
                }
                report.outcome = RunOutcome::Completed;
            }
            Err(err) => {
                let checkpoint = self.save_progress(last_attempted);
                tracing::error!(direction = label, error = %err, "migration failed");
                report.outcome = RunOutcome::Aborted {
                    error: err.to_string(),
                    write_rejected: err.is_write_rejected(),
                    checkpoint,
                };
            }
        }

        report.finished_at = Utc::now();
        report
    }

    fn stream(
        &self,
        report: &mut RunReport,
        last_attempted: &mut Option<RecordId>,
    ) -> Result<(), SyncError> {
        let label = self.direction.label();

        let checkpoint = self.checkpoint.load()?;
        if let Some(id) = &checkpoint {
            tracing::info!(direction = label, record_id = %id, "found saved progress");
        }
        last_attempted.clone_from(&checkpoint);
        report.resumed_from.clone_from(&checkpoint);

        let records = self.capabilities.source.fetch_all()?;
        tracing::info!(direction = label, records = records.len(), "fetched source records");

        let mut phase = if checkpoint.is_some() {
            Phase::Resuming
        } else {
            Phase::Streaming
        };

        for record in &records {
            if phase == Phase::Resuming {
                if checkpoint.as_ref() == Some(&record.id) {
                    tracing::info!(direction = label, record_id = %record.id, "resuming from saved progress");
                    phase = Phase::Streaming;
                } else {
                    report.skipped_before_checkpoint += 1;
                    continue;
                }
            }

            *last_attempted = Some(record.id.clone());
            report.attempted += 1;
            self.migrate_record(record, report)?;
        }

        if phase == Phase::Resuming {
            if let Some(id) = &checkpoint {
                tracing::warn!(
                    direction = label,
                    record_id = %id,
                    "saved progress id not found in source; no records were attempted"
                );
            }
        }

        Ok(())
    }

    fn migrate_record(&self, record: &SourceRecord, report: &mut RunReport) -> Result<(), SyncError> {
        let label = self.direction.label();
        let draft = self.direction.source_shape().extract(&record.fields);

        tracing::debug!(direction = label, record_id = %record.id, fields = %record.fields, "contact");
        tracing::debug!(direction = label, record_id = %record.id, parsed = ?draft, "parsed data");

        let contact = match draft.into_contact() {
            Ok(contact) => contact,
            Err(missing) => {
                tracing::info!(
                    direction = label,
                    record_id = %record.id,
                    missing = ?missing,
                    "some row values are missing"
                );
                report.skipped_invalid += 1;
                return Ok(());
            }
        };

        let key = MatchKey {
            contact: &contact,
            rule: self.direction.match_rule(),
        };
        if self.capabilities.oracle.exists(&key)? {
            tracing::info!(
                direction = label,
                record_id = %record.id,
                rule = %key.rule,
                "contact already exists"
            );
            report.skipped_duplicate += 1;
            return Ok(());
        }

        match self.capabilities.writer.create(&contact)? {
            CreateOutcome::Created(id) => {
                tracing::info!(direction = label, record_id = %record.id, target_id = %id, "contact created");
                report.created.push(id);
                Ok(())
            }
            CreateOutcome::Rejected(messages) => Err(SyncError::WriteRejected {
                record_id: record.id.clone(),
                messages,
            }),
        }
    }

    fn save_progress(&self, last_attempted: Option<RecordId>) -> CheckpointWrite {
        let label = self.direction.label();
        let Some(record_id) = last_attempted else {
            tracing::warn!(direction = label, "no record attempted; progress not saved");
            return CheckpointWrite::NothingToSave;
        };

        tracing::info!(direction = label, record_id = %record_id, "saving progress");
        match self.checkpoint.save(&record_id) {
            Ok(()) => {
                tracing::info!(direction = label, "progress successfully saved");
                CheckpointWrite::Saved { record_id }
            }
            Err(err) => {
                tracing::error!(direction = label, error = %err, "progress saving failed");
                CheckpointWrite::Failed {
                    record_id,
                    error: err.to_string(),
                }
            }
        }
    }

    fn clear_progress(&self) {
        let label = self.direction.label();
        match self.checkpoint.clear() {
            Ok(true) => tracing::info!(direction = label, "saved progress cleared"),
            Ok(false) => {}
            Err(err) => tracing::warn!(direction = label, error = %err, "clearing saved progress failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
