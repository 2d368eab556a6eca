//! # leadsync-connectors
//!
//! Notion and Salesforce bindings for the migration capabilities, plus
//! configuration loading and the [`pipeline`] entrypoint.

pub mod config;
pub mod error;
mod http;
pub mod notion;
pub mod pipeline;
pub mod salesforce;

pub use config::Config;
pub use error::{ConfigError, ConnectorError};
pub use notion::NotionClient;
pub use pipeline::{run_at, Clients, SyncScope};
pub use salesforce::{SalesforceClient, Session};
