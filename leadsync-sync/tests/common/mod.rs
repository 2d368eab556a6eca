//! In-memory stores for driving the orchestrator without a network.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use leadsync_core::{CheckpointStore, Contact, Direction, RecordId, SourceRecord};
use leadsync_sync::{
    Capabilities, CreateOutcome, DedupOracle, MatchKey, Orchestrator, RunOptions, RunReport,
    SourceReader, SyncError, TargetWriter,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub fn contact(last_name: &str, phone: &str, company: &str) -> Contact {
    Contact {
        last_name: last_name.to_string(),
        phone_number: phone.to_string(),
        company: company.to_string(),
    }
}

/// A Notion database page as returned by a database query.
pub fn notion_page(id: &str, last_name: &str, phone: &str, company: &str) -> SourceRecord {
    let title: Value = if last_name.is_empty() {
        json!([])
    } else {
        json!([{ "type": "text", "text": { "content": last_name } }])
    };
    SourceRecord::new(
        id,
        json!({
            "object": "page",
            "id": id,
            "properties": {
                "LastName": { "type": "title", "title": title },
                "Phone": { "type": "phone_number", "phone_number": phone },
                "Company": {
                    "type": "rich_text",
                    "rich_text": [{ "type": "text", "text": { "content": company } }]
                }
            }
        }),
    )
}

/// A Salesforce lead as returned by SOQL.
pub fn salesforce_lead(id: &str, last_name: &str, phone: &str, company: &str) -> SourceRecord {
    SourceRecord::new(
        id,
        json!({
            "attributes": { "type": "Lead" },
            "Id": id,
            "LastName": last_name,
            "Phone": phone,
            "Company": company
        }),
    )
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

pub struct FakeSource {
    records: Vec<SourceRecord>,
    fetches: RefCell<usize>,
}

impl FakeSource {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            records,
            fetches: RefCell::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.borrow()
    }
}

impl SourceReader for FakeSource {
    fn fetch_all(&self) -> Result<Vec<SourceRecord>, SyncError> {
        *self.fetches.borrow_mut() += 1;
        Ok(self.records.clone())
    }
}

/// A call observed by [`FakeTarget`], keyed by the contact's last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    Create(String),
}

/// Target store holding contacts in memory and evaluating match rules itself.
#[derive(Default)]
pub struct FakeTarget {
    existing: RefCell<Vec<Contact>>,
    rejections: HashMap<String, Vec<String>>,
    unreachable_on: Option<String>,
    calls: RefCell<Vec<Call>>,
    next_id: RefCell<usize>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(contacts: Vec<Contact>) -> Self {
        Self {
            existing: RefCell::new(contacts),
            ..Self::default()
        }
    }

    /// Reject creation of the contact with `last_name`.
    pub fn rejecting(mut self, last_name: &str, messages: &[&str]) -> Self {
        self.rejections.insert(
            last_name.to_string(),
            messages.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Fail the dedup query for the contact with `last_name` as a transport error.
    pub fn unreachable_on(mut self, last_name: &str) -> Self {
        self.unreachable_on = Some(last_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(name) => Some(name),
                Call::Exists(_) => None,
            })
            .collect()
    }

    pub fn touched(&self, last_name: &str) -> bool {
        self.calls().iter().any(|c| match c {
            Call::Exists(name) | Call::Create(name) => name == last_name,
        })
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.existing.borrow().clone()
    }
}

impl DedupOracle for FakeTarget {
    fn exists(&self, key: &MatchKey<'_>) -> Result<bool, SyncError> {
        self.calls
            .borrow_mut()
            .push(Call::Exists(key.contact.last_name.clone()));
        if self.unreachable_on.as_deref() == Some(key.contact.last_name.as_str()) {
            return Err(SyncError::transport("querying target", "connection reset by peer"));
        }
        Ok(self
            .existing
            .borrow()
            .iter()
            .any(|existing| key.rule.matches(key.contact, existing)))
    }
}

impl TargetWriter for FakeTarget {
    fn create(&self, contact: &Contact) -> Result<CreateOutcome, SyncError> {
        self.calls
            .borrow_mut()
            .push(Call::Create(contact.last_name.clone()));
        if let Some(messages) = self.rejections.get(&contact.last_name) {
            return Ok(CreateOutcome::Rejected(messages.clone()));
        }
        self.existing.borrow_mut().push(contact.clone());
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        Ok(CreateOutcome::Created(RecordId::from(format!("target-{next}"))))
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub fn run(
    direction: Direction,
    source: &FakeSource,
    target: &FakeTarget,
    store: &CheckpointStore,
    options: RunOptions,
) -> RunReport {
    Orchestrator::new(
        direction,
        Capabilities {
            source,
            oracle: target,
            writer: target,
        },
        store.clone(),
        options,
    )
    .run()
}
