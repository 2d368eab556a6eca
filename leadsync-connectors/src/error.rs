//! Error types for leadsync-connectors.

use std::path::PathBuf;

use thiserror::Error;

use leadsync_sync::SyncError;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting has no value in the file or the environment.
    #[error("missing configuration value {key}; set it in the environment or the config file")]
    Missing { key: &'static str },

    /// YAML parse error on load, with the file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors from talking to Notion or Salesforce.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The request never produced an HTTP response.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Transport),

    /// The store answered with an error status.
    #[error("{service} API error (status {status}): {}", .messages.join(","))]
    Api {
        service: &'static str,
        status: u16,
        messages: Vec<String>,
    },

    /// A response body could not be decoded.
    #[error("invalid {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A response decoded but lacked a required field.
    #[error("invalid {service} response: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },

    #[error("Salesforce login failed: {0}")]
    Login(String),

    /// The SOAP login response was not well-formed XML.
    #[error("invalid Salesforce login response: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid Salesforce server URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<ConnectorError> for SyncError {
    fn from(err: ConnectorError) -> Self {
        let context = match &err {
            ConnectorError::Login(_) | ConnectorError::Xml(_) | ConnectorError::Url(_) => {
                "authenticating"
            }
            _ => "calling store",
        };
        SyncError::transport(context, err)
    }
}
