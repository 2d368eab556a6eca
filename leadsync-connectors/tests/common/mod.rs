//! Mock-server helpers for the blocking store clients.

#![allow(dead_code)]

use leadsync_connectors::config::{NotionConfig, SalesforceConfig};
use leadsync_connectors::{NotionClient, SalesforceClient};
use leadsync_core::Contact;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DATABASE_ID: &str = "db-1";
pub const NOTION_TOKEN: &str = "secret_test";
pub const SESSION_ID: &str = "00D000000000001!AQ4AQ";

pub fn contact(last_name: &str, phone: &str, company: &str) -> Contact {
    Contact {
        last_name: last_name.to_string(),
        phone_number: phone.to_string(),
        company: company.to_string(),
    }
}

pub fn notion_client(base_url: &str) -> NotionClient {
    let config = NotionConfig {
        auth_token: Some(NOTION_TOKEN.to_string()),
        lead_database_id: Some(DATABASE_ID.to_string()),
        api_base_url: base_url.to_string(),
        ..NotionConfig::default()
    };
    NotionClient::from_config(&config, ureq::agent()).expect("notion config")
}

pub fn salesforce_client(login_url: &str) -> SalesforceClient {
    let config = SalesforceConfig {
        login_url: login_url.to_string(),
        username: Some("ops@example.com".to_string()),
        password: Some("hunter2".to_string()),
        ..SalesforceConfig::default()
    };
    SalesforceClient::from_config(&config, ureq::agent()).expect("salesforce config")
}

pub fn notion_page(id: &str, last_name: &str, phone: &str, company: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "LastName": { "type": "title", "title": [{ "type": "text", "text": { "content": last_name } }] },
            "Phone": { "type": "phone_number", "phone_number": phone },
            "Company": { "type": "rich_text", "rich_text": [{ "type": "text", "text": { "content": company } }] }
        }
    })
}

pub fn notion_results(pages: Vec<Value>) -> Value {
    json!({ "object": "list", "results": pages, "has_more": false, "next_cursor": null })
}

pub fn salesforce_lead(id: &str, last_name: &str, phone: &str, company: &str) -> Value {
    json!({
        "attributes": { "type": "Lead", "url": format!("/services/data/v59.0/sobjects/Lead/{id}") },
        "Id": id,
        "LastName": last_name,
        "Phone": phone,
        "Company": company
    })
}

pub fn soql_result(records: Vec<Value>) -> Value {
    json!({ "totalSize": records.len(), "done": true, "records": records })
}

pub fn login_response(server_uri: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soapenv:Body><loginResponse><result>",
            "<serverUrl>{uri}/services/Soap/u/59.0/00D000000000001</serverUrl>",
            "<sessionId>{session}</sessionId>",
            "</result></loginResponse></soapenv:Body></soapenv:Envelope>"
        ),
        uri = server_uri,
        session = SESSION_ID
    )
}

/// Mount a SOAP login endpoint that must be hit exactly `times` times.
pub async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/services/Soap/u/59.0"))
        .and(header("SOAPAction", "login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/xml")
                .set_body_string(login_response(&server.uri())),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Run a blocking client call off the async test runtime.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.expect("blocking task panicked")
}
