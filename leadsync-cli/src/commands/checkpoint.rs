//! `leadsync checkpoint show|clear`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use leadsync_connectors::Config;
use leadsync_core::{CheckpointStore, Direction};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Subcommand, Debug)]
pub enum CheckpointCommand {
    /// Show the saved resume point for one or both directions.
    Show {
        direction: Option<Direction>,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Delete the saved resume point so the next run starts from the top.
    Clear { direction: Direction },
}

#[derive(Debug, Serialize)]
struct CheckpointEntry {
    direction: Direction,
    path: PathBuf,
    row_id: Option<String>,
}

#[derive(Tabled)]
struct CheckpointRow {
    #[tabled(rename = "direction")]
    direction: String,
    #[tabled(rename = "resume at")]
    row_id: String,
    #[tabled(rename = "file")]
    path: String,
}

pub fn run(command: CheckpointCommand, config_path: Option<&Path>) -> Result<()> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let config = Config::load_at(&home, config_path).context("failed to load configuration")?;
    let dir = config.checkpoint_dir_at(&home);

    match command {
        CheckpointCommand::Show { direction, json } => {
            let directions = match direction {
                Some(direction) => vec![direction],
                None => Direction::all().to_vec(),
            };
            let entries = directions
                .into_iter()
                .map(|direction| {
                    let store = CheckpointStore::in_dir(&dir, direction);
                    let row_id = store
                        .load()
                        .with_context(|| format!("failed to read checkpoint for {direction}"))?;
                    Ok(CheckpointEntry {
                        direction,
                        path: store.path().to_path_buf(),
                        row_id: row_id.map(|id| id.to_string()),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries)
                        .context("failed to serialize checkpoints")?
                );
            } else {
                print_table(entries);
            }
        }
        CheckpointCommand::Clear { direction } => {
            let store = CheckpointStore::in_dir(&dir, direction);
            let removed = store
                .clear()
                .with_context(|| format!("failed to clear checkpoint for {direction}"))?;
            if removed {
                println!("✓ Cleared checkpoint for {}", direction.label());
            } else {
                println!("No checkpoint saved for {}", direction.label());
            }
        }
    }
    Ok(())
}

fn print_table(entries: Vec<CheckpointEntry>) {
    let rows: Vec<CheckpointRow> = entries
        .into_iter()
        .map(|entry| CheckpointRow {
            direction: entry.direction.label().to_string(),
            row_id: entry.row_id.unwrap_or_else(|| "-".to_string()),
            path: entry.path.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
