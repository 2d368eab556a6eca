//! Salesforce REST client for `Lead` sobjects.
//!
//! Authentication uses the SOAP partner `login` call with username and
//! password (security token appended to the password when the org needs
//! one). The session is established on first use and reused afterwards.

use std::cell::RefCell;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use leadsync_core::{Contact, MatchRule, RecordId, SourceRecord};
use leadsync_sync::{CreateOutcome, DedupOracle, MatchKey, SourceReader, SyncError, TargetWriter};

use crate::config::{require, SalesforceConfig, SALESFORCE_PASS, SALESFORCE_USER};
use crate::error::{ConfigError, ConnectorError};
use crate::http::{self, ApiFailure};

const SERVICE: &str = "Salesforce";

/// SOQL listing every lead in a stable order.
pub const LIST_LEADS_SOQL: &str = "SELECT Id, LastName, Phone, Company FROM Lead ORDER BY Id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    total_size: u64,
    #[serde(default = "done_default")]
    done: bool,
    records: Vec<Value>,
}

fn done_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct SaveResult {
    id: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEntry {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// An authenticated API session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub instance_url: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
struct Credentials {
    login_url: String,
    username: String,
    password: String,
}

/// Blocking client for the `Lead` sobject of one org.
#[derive(Debug)]
pub struct SalesforceClient {
    agent: ureq::Agent,
    api_version: String,
    credentials: Option<Credentials>,
    session: RefCell<Option<Session>>,
}

impl SalesforceClient {
    /// Client that logs in with the configured credentials on first use.
    pub fn from_config(config: &SalesforceConfig, agent: ureq::Agent) -> Result<Self, ConfigError> {
        let credentials = Credentials {
            login_url: config.login_url.trim_end_matches('/').to_string(),
            username: require(&config.username, SALESFORCE_USER)?.to_string(),
            password: require(&config.password, SALESFORCE_PASS)?.to_string(),
        };
        Ok(Self {
            agent,
            api_version: config.api_version.clone(),
            credentials: Some(credentials),
            session: RefCell::new(None),
        })
    }

    /// Client bound to an existing session.
    pub fn with_session(session: Session, api_version: impl Into<String>, agent: ureq::Agent) -> Self {
        Self {
            agent,
            api_version: api_version.into(),
            credentials: None,
            session: RefCell::new(Some(session)),
        }
    }

    /// The current session, logging in if there is none yet.
    pub fn session(&self) -> Result<Session, ConnectorError> {
        if let Some(session) = self.session.borrow().as_ref() {
            return Ok(session.clone());
        }
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ConnectorError::Login("no session and no credentials".to_string()))?;
        let session = self.login(credentials)?;
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    fn login(&self, credentials: &Credentials) -> Result<Session, ConnectorError> {
        let url = format!(
            "{}/services/Soap/u/{}",
            credentials.login_url, self.api_version
        );
        tracing::debug!(url = %url, username = %credentials.username, "logging in to Salesforce");

        let result = self
            .agent
            .post(&url)
            .set("Content-Type", "text/xml; charset=UTF-8")
            .set("SOAPAction", "login")
            .send_string(&login_envelope(&credentials.username, &credentials.password));

        let body = match http::classify(result)? {
            Ok(response) => response
                .into_string()
                .map_err(|source| ConnectorError::Decode { service: SERVICE, source })?,
            Err(failure) => {
                let reason = read_login_result(&failure.body)
                    .ok()
                    .and_then(|parsed| parsed.fault)
                    .unwrap_or_else(|| http::raw_message(&failure));
                return Err(ConnectorError::Login(reason));
            }
        };

        let parsed = read_login_result(&body)?;
        let server_url = parsed
            .server_url
            .ok_or_else(|| ConnectorError::Login("response has no serverUrl".to_string()))?;
        let access_token = parsed
            .session_id
            .ok_or_else(|| ConnectorError::Login("response has no sessionId".to_string()))?;
        let session = Session {
            instance_url: instance_origin(&server_url)?,
            access_token,
        };
        tracing::info!(instance_url = %session.instance_url, "logged in to Salesforce");
        Ok(session)
    }

    fn data_url(&self, session: &Session, path: &str) -> String {
        format!(
            "{}/services/data/v{}{path}",
            session.instance_url, self.api_version
        )
    }

    /// Run a SOQL query and return its first batch of records.
    pub fn query(&self, soql: &str) -> Result<QueryPage, ConnectorError> {
        let session = self.session()?;
        let result = self
            .agent
            .get(&self.data_url(&session, "/query"))
            .set("Authorization", &format!("Bearer {}", session.access_token))
            .query("q", soql)
            .call();
        let response = http::expect_ok(SERVICE, result, error_messages)?;
        let page: QueryResponse = http::read_json(SERVICE, response)?;
        if !page.done {
            tracing::warn!(
                total = page.total_size,
                returned = page.records.len(),
                "Salesforce query has more records; only the first batch is used"
            );
        }
        Ok(QueryPage {
            total_size: page.total_size,
            records: page.records,
        })
    }

    /// Create a lead. Rejections by the org come back as `Err(messages)`.
    pub fn create_lead(&self, contact: &Contact) -> Result<Result<RecordId, Vec<String>>, ConnectorError> {
        let session = self.session()?;
        let result = self
            .agent
            .post(&self.data_url(&session, "/sobjects/Lead/"))
            .set("Authorization", &format!("Bearer {}", session.access_token))
            .send_json(lead_body(contact));

        match http::classify(result)? {
            Ok(response) => {
                let saved: SaveResult = http::read_json(SERVICE, response)?;
                match (saved.id, saved.errors.is_empty()) {
                    (Some(id), true) => Ok(Ok(RecordId::from(id))),
                    (_, false) => Ok(Err(format_errors(&saved.errors))),
                    (None, true) => Err(ConnectorError::Malformed {
                        service: SERVICE,
                        detail: "create result without id".to_string(),
                    }),
                }
            }
            Err(failure) if failure.is_rejection() => Ok(Err(error_messages(&failure))),
            Err(failure) => Err(ConnectorError::Api {
                service: SERVICE,
                status: failure.status,
                messages: error_messages(&failure),
            }),
        }
    }
}

/// First batch of a SOQL query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub total_size: u64,
    pub records: Vec<Value>,
}

impl SourceReader for SalesforceClient {
    fn fetch_all(&self) -> Result<Vec<SourceRecord>, SyncError> {
        let page = self
            .query(LIST_LEADS_SOQL)
            .map_err(|e| SyncError::transport("listing Salesforce leads", e))?;
        page.records
            .into_iter()
            .map(|lead| match lead.get("Id").and_then(Value::as_str) {
                Some(id) => Ok(SourceRecord::new(id.to_string(), lead)),
                None => Err(SyncError::from(ConnectorError::Malformed {
                    service: SERVICE,
                    detail: "lead without Id".to_string(),
                })),
            })
            .collect()
    }
}

impl DedupOracle for SalesforceClient {
    fn exists(&self, key: &MatchKey<'_>) -> Result<bool, SyncError> {
        let page = self
            .query(&match_soql(key.contact, key.rule))
            .map_err(|e| SyncError::transport("searching Salesforce for existing lead", e))?;
        Ok(page.total_size > 0)
    }
}

impl TargetWriter for SalesforceClient {
    fn create(&self, contact: &Contact) -> Result<CreateOutcome, SyncError> {
        match self
            .create_lead(contact)
            .map_err(|e| SyncError::transport("creating Salesforce lead", e))?
        {
            Ok(id) => Ok(CreateOutcome::Created(id)),
            Err(messages) => Ok(CreateOutcome::Rejected(messages)),
        }
    }
}

// ---------------------------------------------------------------------------
// SOQL and payloads
// ---------------------------------------------------------------------------

/// Quote `value` as a SOQL string literal.
pub fn soql_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

/// Dedup query for `rule`.
pub fn match_soql(contact: &Contact, rule: MatchRule) -> String {
    let last_name = format!("LastName = {}", soql_literal(&contact.last_name));
    let phone = format!("Phone = {}", soql_literal(&contact.phone_number));
    let condition = match rule {
        MatchRule::LastNameAndPhone => format!("{last_name} AND {phone}"),
        MatchRule::AnyField => format!(
            "{last_name} OR {phone} OR Company = {}",
            soql_literal(&contact.company)
        ),
    };
    format!("SELECT Id FROM Lead WHERE {condition} LIMIT 1")
}

/// `POST /sobjects/Lead/` body.
pub fn lead_body(contact: &Contact) -> Value {
    json!({
        "LastName": contact.last_name,
        "Company": contact.company,
        "Phone": contact.phone_number,
    })
}

fn format_errors(errors: &[ErrorEntry]) -> Vec<String> {
    errors
        .iter()
        .map(|e| match &e.error_code {
            Some(code) => format!("{code}: {}", e.message),
            None => e.message.clone(),
        })
        .collect()
}

fn error_messages(failure: &ApiFailure) -> Vec<String> {
    match serde_json::from_str::<Vec<ErrorEntry>>(&failure.body) {
        Ok(errors) if !errors.is_empty() => format_errors(&errors),
        _ => vec![http::raw_message(failure)],
    }
}

// ---------------------------------------------------------------------------
// SOAP login helpers
// ---------------------------------------------------------------------------

fn login_envelope(username: &str, password: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8" ?>"#,
            r#"<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<env:Body><n1:login xmlns:n1="urn:partner.soap.sforce.com">"#,
            "<n1:username>{}</n1:username><n1:password>{}</n1:password>",
            "</n1:login></env:Body></env:Envelope>"
        ),
        escape(username),
        escape(password)
    )
}

/// Values read from a SOAP `login` response or fault.
#[derive(Debug, Default, PartialEq, Eq)]
struct LoginResult {
    server_url: Option<String>,
    session_id: Option<String>,
    fault: Option<String>,
}

/// First text of `serverUrl`, `sessionId` and `faultstring`, matched by
/// local name. Self-closing (nil) elements leave the value unset.
fn read_login_result(xml: &str) -> Result<LoginResult, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = LoginResult::default();
    let mut current: Option<Vec<u8>> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => current = Some(e.local_name().as_ref().to_vec()),
            Event::End(_) | Event::Empty(_) => current = None,
            Event::Text(text) => {
                let slot = match current.as_deref() {
                    Some(b"serverUrl") => &mut parsed.server_url,
                    Some(b"sessionId") => &mut parsed.session_id,
                    Some(b"faultstring") => &mut parsed.fault,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(text.unescape()?.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parsed)
}

/// `scheme://host[:port]` of the SOAP server URL.
fn instance_origin(server_url: &str) -> Result<String, ConnectorError> {
    let origin = Url::parse(server_url)?.origin();
    if !origin.is_tuple() {
        return Err(ConnectorError::Login(format!(
            "serverUrl {server_url} has no host"
        )));
    }
    Ok(origin.ascii_serialization())
}
