//! The two migration directions and their per-direction rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shape::ContactShape;
use crate::types::MatchRule;

/// One migration flow from a source store to a target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Notion database pages into Salesforce leads.
    NotionToSalesforce,
    /// Salesforce leads into the Notion database.
    SalesforceToNotion,
}

impl Direction {
    pub fn all() -> &'static [Direction] {
        &[Direction::NotionToSalesforce, Direction::SalesforceToNotion]
    }

    /// Short label used as the log prefix for this direction.
    pub fn label(self) -> &'static str {
        match self {
            Direction::NotionToSalesforce => "Notion2Salesforce",
            Direction::SalesforceToNotion => "Salesforce2Notion",
        }
    }

    pub fn checkpoint_file_name(self) -> &'static str {
        match self {
            Direction::NotionToSalesforce => "notion2salesforce.json",
            Direction::SalesforceToNotion => "salesforce2notion.json",
        }
    }

    /// Where the contact fields live in records read from the source store.
    pub fn source_shape(self) -> ContactShape {
        match self {
            Direction::NotionToSalesforce => ContactShape::NOTION_PAGE,
            Direction::SalesforceToNotion => ContactShape::SALESFORCE_LEAD,
        }
    }

    /// Dedup rule applied against the target store.
    ///
    /// The two directions deliberately differ: into Salesforce needs both
    /// last name and phone to match, into Notion any single field is enough.
    /// Kept as-is pending product review.
    pub fn match_rule(self) -> MatchRule {
        match self {
            Direction::NotionToSalesforce => MatchRule::LastNameAndPhone,
            Direction::SalesforceToNotion => MatchRule::AnyField,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::NotionToSalesforce => write!(f, "notion-to-salesforce"),
            Direction::SalesforceToNotion => write!(f, "salesforce-to-notion"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notion-to-salesforce" | "notion2salesforce" => Ok(Direction::NotionToSalesforce),
            "salesforce-to-notion" | "salesforce2notion" => Ok(Direction::SalesforceToNotion),
            other => Err(format!(
                "unknown direction '{other}'; expected: notion-to-salesforce, salesforce-to-notion"
            )),
        }
    }
}
