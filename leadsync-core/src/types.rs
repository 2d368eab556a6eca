//! Domain types shared by every leadsync crate.
//!
//! All types are serializable via serde; JSON field names follow the
//! camelCase shape used on disk and in log output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identifier for a record in either store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Canonical contact shape migrated between stores.
///
/// Every field is non-empty; build one through
/// [`ContactDraft::into_contact`](crate::shape::ContactDraft::into_contact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub last_name: String,
    pub phone_number: String,
    pub company: String,
}

/// A record as listed by a source store: a stable id plus its raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: RecordId,
    pub fields: Value,
}

impl SourceRecord {
    pub fn new(id: impl Into<RecordId>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

// ---------------------------------------------------------------------------
// Dedup matching
// ---------------------------------------------------------------------------

/// Which contact fields must equal a target record's for the candidate to
/// count as already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRule {
    /// `lastName` AND `phoneNumber` both equal.
    LastNameAndPhone,
    /// `lastName` OR `phoneNumber` OR `company` equal.
    AnyField,
}

impl MatchRule {
    /// Evaluate the rule against an existing record.
    pub fn matches(self, candidate: &Contact, existing: &Contact) -> bool {
        let last_name = candidate.last_name == existing.last_name;
        let phone = candidate.phone_number == existing.phone_number;
        match self {
            MatchRule::LastNameAndPhone => last_name && phone,
            MatchRule::AnyField => last_name || phone || candidate.company == existing.company,
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::LastNameAndPhone => write!(f, "lastName AND phone"),
            MatchRule::AnyField => write!(f, "lastName OR phone OR company"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
