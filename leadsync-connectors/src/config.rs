//! Store credentials and endpoints.
//!
//! Resolved once at startup: an optional YAML file
//! (`<home>/.leadsync/config.yaml` unless a path is given), then
//! environment variables on top.
//!
//! ```yaml
//! notion:
//!   auth_token: secret_abc
//!   lead_database_id: 8f0c...
//! salesforce:
//!   login_url: https://login.salesforce.com
//!   username: ops@example.com
//!   password: hunter2TOKEN
//! checkpoint_dir: /var/lib/leadsync
//! timeout_secs: 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const NOTION_AUTH_TOKEN: &str = "NOTION_AUTH_TOKEN";
pub const NOTION_LEAD_DATABASE_ID: &str = "NOTION_LEAD_DATABASE_ID";
pub const NOTION_API_BASE_URL: &str = "NOTION_API_BASE_URL";
pub const SALESFORCE_LOGIN_URL: &str = "SALESFORCE_LOGIN_URL";
pub const SALESFORCE_USER: &str = "SALESFORCE_USER";
pub const SALESFORCE_PASS: &str = "SALESFORCE_PASS";
pub const SALESFORCE_API_VERSION: &str = "SALESFORCE_API_VERSION";
pub const LEADSYNC_CHECKPOINT_DIR: &str = "LEADSYNC_CHECKPOINT_DIR";

const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_SALESFORCE_LOGIN_URL: &str = "https://login.salesforce.com";
const DEFAULT_SALESFORCE_API_VERSION: &str = "59.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    pub auth_token: Option<String>,
    pub lead_database_id: Option<String>,
    pub api_base_url: String,
    pub notion_version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            lead_database_id: None,
            api_base_url: DEFAULT_NOTION_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_version: String,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_SALESFORCE_LOGIN_URL.to_string(),
            username: None,
            password: None,
            api_version: DEFAULT_SALESFORCE_API_VERSION.to_string(),
        }
    }
}

/// Everything needed to wire both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notion: NotionConfig,
    pub salesforce: SalesforceConfig,
    /// Overrides `<home>/.leadsync/checkpoints`.
    pub checkpoint_dir: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion: NotionConfig::default(),
            salesforce: SalesforceConfig::default(),
            checkpoint_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `<home>/.leadsync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".leadsync").join("config.yaml")
}

impl Config {
    /// Load from `explicit` or the default file under `home`, then apply
    /// the process environment.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn load_at(home: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::from_file(path)?,
            None => {
                let path = config_path_at(home);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields with non-empty values returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(NOTION_AUTH_TOKEN) {
            self.notion.auth_token = Some(v);
        }
        if let Some(v) = get(NOTION_LEAD_DATABASE_ID) {
            self.notion.lead_database_id = Some(v);
        }
        if let Some(v) = get(NOTION_API_BASE_URL) {
            self.notion.api_base_url = v;
        }
        if let Some(v) = get(SALESFORCE_LOGIN_URL) {
            self.salesforce.login_url = v;
        }
        if let Some(v) = get(SALESFORCE_USER) {
            self.salesforce.username = Some(v);
        }
        if let Some(v) = get(SALESFORCE_PASS) {
            self.salesforce.password = Some(v);
        }
        if let Some(v) = get(SALESFORCE_API_VERSION) {
            self.salesforce.api_version = v;
        }
        if let Some(v) = get(LEADSYNC_CHECKPOINT_DIR) {
            self.checkpoint_dir = Some(PathBuf::from(v));
        }
    }

    /// Directory holding the per-direction checkpoint files.
    pub fn checkpoint_dir_at(&self, home: &Path) -> PathBuf {
        self.checkpoint_dir
            .clone()
            .unwrap_or_else(|| leadsync_core::checkpoint::checkpoint_dir_at(home))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Return the value or a [`ConfigError::Missing`] naming `key`.
pub(crate) fn require<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::Missing { key })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
