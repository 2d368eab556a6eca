//! `leadsync migrate`: run one or both migration directions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use leadsync_connectors::{pipeline, Config, SyncScope};
use leadsync_core::Direction;
use leadsync_sync::{CheckpointWrite, RunOptions, RunOutcome, RunReport};

/// Arguments for `leadsync migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Direction to run: notion-to-salesforce | salesforce-to-notion.
    #[arg(required_unless_present = "all")]
    pub direction: Option<Direction>,

    /// Run both directions, Notion to Salesforce first.
    #[arg(long, conflicts_with = "direction")]
    pub all: bool,

    /// Leave the checkpoint file in place after a run that finished.
    #[arg(long)]
    pub keep_checkpoint: bool,

    /// Exit non-zero when any run aborts.
    #[arg(long)]
    pub strict: bool,

    /// Print the run reports as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

impl MigrateArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config = Config::load_at(&home, config_path).context("failed to load configuration")?;

        let scope = match self.direction {
            Some(direction) => SyncScope::Direction(direction),
            None => SyncScope::All,
        };
        let options = RunOptions {
            clear_checkpoint_on_success: !self.keep_checkpoint,
        };
        let reports = pipeline::run_at(&home, &config, scope, options)
            .context("cannot start migration")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).context("failed to serialize run reports")?
            );
        } else {
            for report in &reports {
                print_report(report);
            }
        }

        let aborted = reports.iter().filter(|r| !r.is_completed()).count();
        if self.strict && aborted > 0 {
            bail!("{aborted} of {} migration run(s) aborted", reports.len());
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    let label = report.direction.label();
    match &report.outcome {
        RunOutcome::Completed => println!(
            "{} {label}: created {}, skipped {} duplicate(s), {} incomplete",
            "✓".green().bold(),
            report.created.len(),
            report.skipped_duplicate,
            report.skipped_invalid,
        ),
        RunOutcome::Aborted {
            error, checkpoint, ..
        } => {
            println!(
                "{} {label}: aborted after creating {}: {error}",
                "✗".red().bold(),
                report.created.len(),
            );
            println!("  {}", checkpoint_line(checkpoint));
        }
    }
    if let Some(id) = &report.resumed_from {
        println!(
            "  resumed from {id} ({} record(s) skipped)",
            report.skipped_before_checkpoint
        );
    }
}

fn checkpoint_line(checkpoint: &CheckpointWrite) -> String {
    match checkpoint {
        CheckpointWrite::Saved { record_id } => {
            format!("progress saved at {record_id}; rerun to resume")
        }
        CheckpointWrite::Failed { record_id, error } => format!(
            "{} could not save progress at {record_id}: {error}",
            "!".yellow().bold()
        ),
        CheckpointWrite::NothingToSave => "no progress to save".to_string(),
    }
}
