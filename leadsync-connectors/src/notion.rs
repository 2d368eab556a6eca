//! Notion database client.
//!
//! Leads live as pages of one database with three properties:
//! `LastName` (title), `Phone` (phone number) and `Company` (rich text).

use serde::Deserialize;
use serde_json::{json, Value};

use leadsync_core::{Contact, MatchRule, RecordId, SourceRecord};
use leadsync_sync::{CreateOutcome, DedupOracle, MatchKey, SourceReader, SyncError, TargetWriter};

use crate::config::{require, NotionConfig, NOTION_AUTH_TOKEN, NOTION_LEAD_DATABASE_ID};
use crate::error::{ConfigError, ConnectorError};
use crate::http::{self, ApiFailure};

const SERVICE: &str = "Notion";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking client for one Notion lead database.
#[derive(Debug, Clone)]
pub struct NotionClient {
    agent: ureq::Agent,
    base_url: String,
    auth_token: String,
    database_id: String,
    notion_version: String,
}

impl NotionClient {
    pub fn from_config(config: &NotionConfig, agent: ureq::Agent) -> Result<Self, ConfigError> {
        Ok(Self {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: require(&config.auth_token, NOTION_AUTH_TOKEN)?.to_string(),
            database_id: require(&config.lead_database_id, NOTION_LEAD_DATABASE_ID)?.to_string(),
            notion_version: config.notion_version.clone(),
        })
    }

    fn post(&self, path: &str, body: &Value) -> Result<ureq::Response, ureq::Error> {
        self.agent
            .post(&format!("{}{path}", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.auth_token))
            .set("Notion-Version", &self.notion_version)
            .send_json(body)
    }

    /// Query the lead database, optionally filtered.
    pub fn query_database(&self, filter: Option<Value>) -> Result<Vec<Value>, ConnectorError> {
        let body = match filter {
            Some(filter) => json!({ "filter": filter }),
            None => json!({}),
        };
        let path = format!("/v1/databases/{}/query", self.database_id);
        let response = http::expect_ok(SERVICE, self.post(&path, &body), error_messages)?;
        let page: QueryResponse = http::read_json(SERVICE, response)?;
        if page.has_more {
            tracing::warn!(
                database_id = %self.database_id,
                returned = page.results.len(),
                "Notion query has more results; only the first page is used"
            );
        }
        Ok(page.results)
    }

    /// Create a lead page. Error statuses about the request itself come
    /// back as `Err(messages)`.
    pub fn create_page(&self, contact: &Contact) -> Result<Result<RecordId, Vec<String>>, ConnectorError> {
        let body = page_body(&self.database_id, contact);
        match http::classify(self.post("/v1/pages", &body))? {
            Ok(response) => {
                let page: PageResponse = http::read_json(SERVICE, response)?;
                Ok(Ok(RecordId::from(page.id)))
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

impl SourceReader for NotionClient {
    fn fetch_all(&self) -> Result<Vec<SourceRecord>, SyncError> {
        let pages = self
            .query_database(None)
            .map_err(|e| SyncError::transport("querying Notion lead database", e))?;
        pages
            .into_iter()
            .map(|page| match page.get("id").and_then(Value::as_str) {
                Some(id) => Ok(SourceRecord::new(id.to_string(), page)),
                None => Err(SyncError::from(ConnectorError::Malformed {
                    service: SERVICE,
                    detail: "page without id".to_string(),
                })),
            })
            .collect()
    }
}

impl DedupOracle for NotionClient {
    fn exists(&self, key: &MatchKey<'_>) -> Result<bool, SyncError> {
        let results = self
            .query_database(Some(match_filter(key.contact, key.rule)))
            .map_err(|e| SyncError::transport("searching Notion for existing lead", e))?;
        Ok(!results.is_empty())
    }
}

impl TargetWriter for NotionClient {
    fn create(&self, contact: &Contact) -> Result<CreateOutcome, SyncError> {
        match self
            .create_page(contact)
            .map_err(|e| SyncError::transport("creating Notion page", e))?
        {
            Ok(id) => Ok(CreateOutcome::Created(id)),
            Err(messages) => Ok(CreateOutcome::Rejected(messages)),
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Database query filter for `rule`.
pub fn match_filter(contact: &Contact, rule: MatchRule) -> Value {
    let last_name = json!({ "property": "LastName", "title": { "equals": contact.last_name } });
    let phone = json!({ "property": "Phone", "phone_number": { "equals": contact.phone_number } });
    match rule {
        MatchRule::LastNameAndPhone => json!({ "and": [last_name, phone] }),
        MatchRule::AnyField => {
            let company = json!({ "property": "Company", "rich_text": { "equals": contact.company } });
            json!({ "or": [last_name, phone, company] })
        }
    }
}

/// `POST /v1/pages` body creating `contact` in `database_id`.
pub fn page_body(database_id: &str, contact: &Contact) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "LastName": {
                "title": [{ "type": "text", "text": { "content": contact.last_name } }]
            },
            "Phone": { "phone_number": contact.phone_number },
            "Company": {
                "rich_text": [{ "type": "text", "text": { "content": contact.company } }]
            }
        }
    })
}

fn error_messages(failure: &ApiFailure) -> Vec<String> {
    match serde_json::from_str::<ErrorBody>(&failure.body) {
        Ok(body) if !body.message.is_empty() => vec![body.message],
        _ => vec![http::raw_message(failure)],
    }
}
