//! Shared migration entrypoint used by the CLI.

use std::path::Path;

use leadsync_core::{CheckpointStore, Direction};
use leadsync_sync::{Capabilities, Orchestrator, RunOptions, RunReport};

use crate::config::Config;
use crate::error::ConfigError;
use crate::http;
use crate::notion::NotionClient;
use crate::salesforce::SalesforceClient;

/// Scope for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Both directions, one after the other.
    All,
    Direction(Direction),
}

impl SyncScope {
    pub fn directions(self) -> Vec<Direction> {
        match self {
            SyncScope::All => Direction::all().to_vec(),
            SyncScope::Direction(direction) => vec![direction],
        }
    }
}

/// Store clients owned by a single direction.
#[derive(Debug)]
pub struct Clients {
    notion: NotionClient,
    salesforce: SalesforceClient,
}

impl Clients {
    /// Build both clients. No request is sent until the first call.
    pub fn connect(config: &Config) -> Result<Self, ConfigError> {
        let agent = http::agent(config.timeout());
        Ok(Self {
            notion: NotionClient::from_config(&config.notion, agent.clone())?,
            salesforce: SalesforceClient::from_config(&config.salesforce, agent)?,
        })
    }

    pub fn new(notion: NotionClient, salesforce: SalesforceClient) -> Self {
        Self { notion, salesforce }
    }

    /// Source, oracle and writer for `direction`.
    pub fn capabilities(&self, direction: Direction) -> Capabilities<'_> {
        match direction {
            Direction::NotionToSalesforce => Capabilities {
                source: &self.notion,
                oracle: &self.salesforce,
                writer: &self.salesforce,
            },
            Direction::SalesforceToNotion => Capabilities {
                source: &self.salesforce,
                oracle: &self.notion,
                writer: &self.notion,
            },
        }
    }
}

/// Run every direction in `scope` with checkpoints under `home`.
///
/// Configuration is validated for all directions before the first run
/// starts. Run failures are reported in the returned [`RunReport`]s.
pub fn run_at(
    home: &Path,
    config: &Config,
    scope: SyncScope,
    options: RunOptions,
) -> Result<Vec<RunReport>, ConfigError> {
    let checkpoint_dir = config.checkpoint_dir_at(home);
    let wired = scope
        .directions()
        .into_iter()
        .map(|direction| Ok((direction, Clients::connect(config)?)))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(wired
        .into_iter()
        .map(|(direction, clients)| {
            let store = CheckpointStore::in_dir(&checkpoint_dir, direction);
            Orchestrator::new(direction, clients.capabilities(direction), store, options).run()
        })
        .collect())
}
