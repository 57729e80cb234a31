//! Page → content-account graph types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which resolution strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Credential is scoped to the content account itself.
    Direct,
    /// Content account found through one of the subject's pages.
    Linked,
    /// Content account found through one aggregate identity query.
    Aggregated,
}

impl StrategyKind {
    /// Fixed priority order in which strategies are attempted.
    pub const ORDER: [StrategyKind; 3] = [Self::Direct, Self::Linked, Self::Aggregated];
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Linked => write!(f, "linked"),
            Self::Aggregated => write!(f, "aggregated"),
        }
    }
}

/// A page the subject administers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    /// Page id.
    pub id: String,
    /// Display name, when the provider returns one.
    #[serde(default)]
    pub name: Option<String>,
}

impl PageRef {
    /// Create a page reference without a name.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: None }
    }
}

/// One hop of the page → content-account graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLink {
    /// Page id.
    pub page_id: String,
    /// Linked business content account, if the page has one.
    pub linked_account_id: Option<String>,
}

impl AccountLink {
    /// A page carrying a linked content account.
    pub fn linked(page_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            linked_account_id: Some(account_id.into()),
        }
    }

    /// A page without a linked content account.
    pub fn unlinked(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            linked_account_id: None,
        }
    }
}

/// Result of a successful strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountHandle {
    /// A content account id still to be fetched.
    Account(String),
    /// Raw listing already fetched by the direct probe.
    Listing(Vec<Value>),
}
