//! leadsync: one-directional contact migration between Notion and Salesforce.
//!
//! # Usage
//!
//! ```text
//! leadsync migrate <direction> [--keep-checkpoint] [--strict] [--json]
//! leadsync migrate --all [--keep-checkpoint] [--strict] [--json]
//! leadsync checkpoint show [<direction>] [--json]
//! leadsync checkpoint clear <direction>
//! ```
//!
//! `<direction>` is `notion-to-salesforce` or `salesforce-to-notion`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{checkpoint::CheckpointCommand, migrate::MigrateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "leadsync",
    version,
    about = "Copy lead contacts between Notion and Salesforce, resuming after failures",
    long_about = None,
)]
struct Cli {
    /// Config file to use instead of ~/.leadsync/config.yaml.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy every source contact that the target does not already have.
    Migrate(MigrateArgs),

    /// Inspect or reset saved resume points.
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Migrate(args) => args.run(config),
        Commands::Checkpoint { command } => commands::checkpoint::run(command, config),
    }
}

/// Run logs go to stderr so `--json` output stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
