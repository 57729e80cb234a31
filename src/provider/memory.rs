//! Scripted in-memory provider for testing.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ContentProvider, ProviderError};
use crate::types::{AccountLink, CredentialContext, PageRef};

/// A call observed by [`InMemoryContentProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `fetch_direct_media`
    DirectMedia,
    /// `fetch_account_media(account_id)`
    AccountMedia(String),
    /// `list_pages`
    ListPages,
    /// `linked_account(page_id)`
    LinkedAccount(String),
    /// `aggregate_links`
    AggregateLinks,
}

fn not_scripted(what: &str) -> ProviderError {
    ProviderError::Api {
        status: 404,
        message: format!("{} not scripted", what),
    }
}

/// In-memory provider with scripted responses.
///
/// Every hop fails with a 404 `Api` error until scripted. Pages with no
/// scripted link resolve as unlinked. Calls are recorded in order.
#[derive(Debug)]
pub struct InMemoryContentProvider {
    direct: Result<Vec<Value>, ProviderError>,
    pages: Result<Vec<PageRef>, ProviderError>,
    links: BTreeMap<String, Result<Option<String>, ProviderError>>,
    aggregate: Result<Vec<AccountLink>, ProviderError>,
    account_media: BTreeMap<String, Result<Vec<Value>, ProviderError>>,
    latency: Option<Duration>,
    page_latency: BTreeMap<String, Duration>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl Default for InMemoryContentProvider {
    fn default() -> Self {
        Self {
            direct: Err(not_scripted("direct media")),
            pages: Err(not_scripted("pages")),
            links: BTreeMap::new(),
            aggregate: Err(not_scripted("aggregate links")),
            account_media: BTreeMap::new(),
            latency: None,
            page_latency: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryContentProvider {
    /// Create a provider where every hop fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the direct listing.
    pub fn with_direct_media(mut self, response: Result<Vec<Value>, ProviderError>) -> Self {
        self.direct = response;
        self
    }

    /// Script the page list.
    pub fn with_pages(mut self, response: Result<Vec<PageRef>, ProviderError>) -> Self {
        self.pages = response;
        self
    }

    /// Script the linked account of one page.
    pub fn with_page_link(
        mut self,
        page_id: impl Into<String>,
        response: Result<Option<String>, ProviderError>,
    ) -> Self {
        self.links.insert(page_id.into(), response);
        self
    }

    /// Script the aggregate identity query.
    pub fn with_aggregate(mut self, response: Result<Vec<AccountLink>, ProviderError>) -> Self {
        self.aggregate = response;
        self
    }

    /// Script the listing of a linked content account.
    pub fn with_account_media(
        mut self,
        account_id: impl Into<String>,
        response: Result<Vec<Value>, ProviderError>,
    ) -> Self {
        self.account_media.insert(account_id.into(), response);
        self
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay the linked-account lookup of one page by `latency`.
    pub fn with_page_latency(mut self, page_id: impl Into<String>, latency: Duration) -> Self {
        self.page_latency.insert(page_id.into(), latency);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn record(&self, call: ProviderCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn truncate(mut records: Vec<Value>, limit: u32) -> Vec<Value> {
    records.truncate(limit as usize);
    records
}

#[async_trait]
impl ContentProvider for InMemoryContentProvider {
    async fn fetch_direct_media(&self, ctx: &CredentialContext) -> Result<Vec<Value>, ProviderError> {
        self.record(ProviderCall::DirectMedia).await;
        self.direct.clone().map(|records| truncate(records, ctx.limit()))
    }

    async fn fetch_account_media(
        &self,
        account_id: &str,
        ctx: &CredentialContext,
    ) -> Result<Vec<Value>, ProviderError> {
        self.record(ProviderCall::AccountMedia(account_id.to_string())).await;
        self.account_media
            .get(account_id)
            .cloned()
            .unwrap_or_else(|| Err(not_scripted("account media")))
            .map(|records| truncate(records, ctx.limit()))
    }

    async fn list_pages(&self, _ctx: &CredentialContext) -> Result<Vec<PageRef>, ProviderError> {
        self.record(ProviderCall::ListPages).await;
        self.pages.clone()
    }

    async fn linked_account(
        &self,
        page_id: &str,
        _ctx: &CredentialContext,
    ) -> Result<AccountLink, ProviderError> {
        self.record(ProviderCall::LinkedAccount(page_id.to_string())).await;
        if let Some(latency) = self.page_latency.get(page_id) {
            tokio::time::sleep(*latency).await;
        }
        let linked = self.links.get(page_id).cloned().unwrap_or(Ok(None))?;
        Ok(AccountLink {
            page_id: page_id.to_string(),
            linked_account_id: linked,
        })
    }

    async fn aggregate_links(&self, _ctx: &CredentialContext) -> Result<Vec<AccountLink>, ProviderError> {
        self.record(ProviderCall::AggregateLinks).await;
        self.aggregate.clone()
    }
}
