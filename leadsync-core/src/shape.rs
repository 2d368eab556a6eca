//! Best-effort extraction of a [`Contact`] from raw record fields.
//!
//! Paths use a small `a.b[0].c` syntax. Any step that does not resolve
//! (missing key, index out of range, `null`, non-string leaf) yields `None`
//! instead of an error.

use serde::Serialize;
use serde_json::Value;

use crate::types::Contact;

/// Resolve `path` inside `value`.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        let (key, mut rest) = match segment.find('[') {
            Some(i) => (&segment[..i], &segment[i..]),
            None => (segment, ""),
        };
        if !key.is_empty() {
            current = current.get(key)?;
        }
        while let Some(open) = rest.strip_prefix('[') {
            let close = open.find(']')?;
            let index: usize = open[..close].parse().ok()?;
            current = current.get(index)?;
            rest = &open[close + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(current)
}

/// Resolve `path` to a non-blank string.
pub fn lookup_text(value: &Value, path: &str) -> Option<String> {
    lookup(value, path)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_owned)
}

/// Where the three contact fields live in a store's raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactShape {
    pub last_name: &'static str,
    pub phone_number: &'static str,
    pub company: &'static str,
}

impl ContactShape {
    /// Notion database page properties.
    pub const NOTION_PAGE: ContactShape = ContactShape {
        last_name: "properties.LastName.title[0].text.content",
        phone_number: "properties.Phone.phone_number",
        company: "properties.Company.rich_text[0].text.content",
    };

    /// Salesforce `Lead` sobject fields.
    pub const SALESFORCE_LEAD: ContactShape = ContactShape {
        last_name: "LastName",
        phone_number: "Phone",
        company: "Company",
    };

    pub fn extract(&self, fields: &Value) -> ContactDraft {
        ContactDraft {
            last_name: lookup_text(fields, self.last_name),
            phone_number: lookup_text(fields, self.phone_number),
            company: lookup_text(fields, self.company),
        }
    }
}

/// Contact fields as found, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
}

impl ContactDraft {
    /// Names of the required fields that are absent.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.last_name.is_none() {
            missing.push("lastName");
        }
        if self.phone_number.is_none() {
            missing.push("phoneNumber");
        }
        if self.company.is_none() {
            missing.push("company");
        }
        missing
    }

    /// Returns the complete contact, or the missing field names.
    pub fn into_contact(self) -> Result<Contact, Vec<&'static str>> {
        match self {
            ContactDraft {
                last_name: Some(last_name),
                phone_number: Some(phone_number),
                company: Some(company),
            } => Ok(Contact {
                last_name,
                phone_number,
                company,
            }),
            draft => Err(draft.missing_fields()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
