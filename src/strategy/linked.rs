//! Linked-account discovery: walk the subject's pages to a linked
//! business content account.

use futures::future::join_all;

use super::{bounded, StrategyError};
use crate::error::ResolutionError;
use crate::pipeline::PipelineConfig;
use crate::provider::{ContentProvider, ProviderError};
use crate::types::{AccountHandle, AccountLink, CredentialContext, PageRef, StrategyKind};

/// Bookkeeping over per-page lookups.
#[derive(Debug, Default)]
struct PageScan {
    failed: usize,
    last_error: Option<ProviderError>,
}

impl PageScan {
    /// Record one lookup; returns the linked account id if the page has one.
    fn observe(&mut self, page: &PageRef, result: Result<AccountLink, ProviderError>) -> Option<String> {
        match result {
            Ok(link) => link.linked_account_id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(page_id = %page.id, error = %e, "Linked account lookup failed");
                self.failed += 1;
                self.last_error = Some(e);
                None
            }
        }
    }

    fn exhausted(self, pages: usize) -> StrategyError {
        match self.last_error {
            Some(e) if self.failed == pages => StrategyError::Exhausted(
                ResolutionError::UpstreamUnavailable(format!(
                    "all {} page lookups failed, last: {}",
                    pages, e
                )),
            ),
            _ => StrategyError::Exhausted(ResolutionError::NoLinkedAccount(format!(
                "none of {} pages has a linked content account",
                pages
            ))),
        }
    }
}

/// Find the first page, in provider order, that carries a linked account.
///
/// Page enumeration failure makes the strategy inapplicable. Zero pages,
/// or pages without a link, exhaust it. Individual lookup failures are
/// skipped. With concurrent lookups enabled every page is queried at once,
/// and the earliest page with a link still wins.
pub async fn discover<P: ContentProvider + ?Sized>(
    provider: &P,
    ctx: &CredentialContext,
    config: &PipelineConfig,
) -> Result<AccountHandle, StrategyError> {
    tracing::debug!(subject_id = ctx.subject_id(), "Enumerating linked pages");

    let pages = bounded(config.call_timeout, provider.list_pages(ctx))
        .await
        .map_err(|e| StrategyError::Inapplicable(e.classify(StrategyKind::Linked)))?;

    if pages.is_empty() {
        return Err(StrategyError::Exhausted(ResolutionError::NoLinkedAccount(
            "subject has no linked pages".to_string(),
        )));
    }

    let mut scan = PageScan::default();

    if config.concurrent_page_lookups {
        let lookups = pages
            .iter()
            .map(|page| bounded(config.call_timeout, provider.linked_account(&page.id, ctx)));
        let results = join_all(lookups).await;

        for (page, result) in pages.iter().zip(results) {
            if let Some(account_id) = scan.observe(page, result) {
                tracing::info!(page_id = %page.id, account_id = %account_id, "Linked account found");
                return Ok(AccountHandle::Account(account_id));
            }
        }
    } else {
        for page in &pages {
            let result = bounded(config.call_timeout, provider.linked_account(&page.id, ctx)).await;
            if let Some(account_id) = scan.observe(page, result) {
                tracing::info!(page_id = %page.id, account_id = %account_id, "Linked account found");
                return Ok(AccountHandle::Account(account_id));
            }
        }
    }

    Err(scan.exhausted(pages.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::provider::memory::ProviderCall;
    use crate::provider::InMemoryContentProvider;
    use std::time::Duration;

    fn ctx() -> CredentialContext {
        CredentialContext::new("token", "u1", 10).unwrap()
    }

    fn pages(ids: &[&str]) -> Vec<PageRef> {
        ids.iter().map(|id| PageRef::new(*id)).collect()
    }

    fn api_error() -> ProviderError {
        ProviderError::Api { status: 500, message: "boom".into() }
    }

    #[tokio::test]
    async fn test_third_page_wins() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2", "p3"])))
            .with_page_link("p3", Ok(Some("ig3".into())));

        let handle = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap();
        assert_eq!(handle, AccountHandle::Account("ig3".into()));
        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::ListPages,
                ProviderCall::LinkedAccount("p1".into()),
                ProviderCall::LinkedAccount("p2".into()),
                ProviderCall::LinkedAccount("p3".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_sequential_stops_at_first_match() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2"])))
            .with_page_link("p1", Ok(Some("ig1".into())))
            .with_page_link("p2", Ok(Some("ig2".into())));

        let handle = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap();
        assert_eq!(handle, AccountHandle::Account("ig1".into()));
        assert!(!provider.calls().contains(&ProviderCall::LinkedAccount("p2".into())));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_pick_earliest_index() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2", "p3"])))
            .with_page_link("p1", Err(api_error()))
            .with_page_link("p2", Ok(Some("ig2".into())))
            .with_page_link("p3", Ok(Some("ig3".into())));
        let config = PipelineConfig {
            concurrent_page_lookups: true,
            ..PipelineConfig::default()
        };

        let handle = discover(&provider, &ctx(), &config).await.unwrap();
        assert_eq!(handle, AccountHandle::Account("ig2".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_prefer_index_over_speed() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2", "p3"])))
            .with_page_link("p2", Ok(Some("ig2".into())))
            .with_page_link("p3", Ok(Some("ig3".into())))
            .with_page_latency("p2", Duration::from_secs(2));
        let config = PipelineConfig {
            concurrent_page_lookups: true,
            ..PipelineConfig::default()
        };

        let handle = discover(&provider, &ctx(), &config).await.unwrap();
        assert_eq!(handle, AccountHandle::Account("ig2".into()));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_skipped() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2"])))
            .with_page_link("p1", Err(api_error()))
            .with_page_link("p2", Ok(Some("ig2".into())));

        let handle = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap();
        assert_eq!(handle, AccountHandle::Account("ig2".into()));
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_inapplicable() {
        let provider = InMemoryContentProvider::new().with_pages(Err(api_error()));
        let err = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap_err();
        assert!(matches!(err, StrategyError::Inapplicable(_)));
        assert_eq!(err.cause().kind(), FailureKind::UpstreamUnavailable);
    }

    #[tokio::test]
    async fn test_zero_pages_is_no_linked_account() {
        let provider = InMemoryContentProvider::new().with_pages(Ok(vec![]));
        let err = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap_err();
        assert!(matches!(err, StrategyError::Exhausted(_)));
        assert_eq!(err.cause().kind(), FailureKind::NoLinkedAccount);
    }

    #[tokio::test]
    async fn test_unlinked_pages_exhaust() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2"])))
            .with_page_link("p1", Ok(Some(String::new())));

        let err = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap_err();
        assert_eq!(err.cause().kind(), FailureKind::NoLinkedAccount);
    }

    #[tokio::test]
    async fn test_every_lookup_failing_is_upstream_unavailable() {
        let provider = InMemoryContentProvider::new()
            .with_pages(Ok(pages(&["p1", "p2"])))
            .with_page_link("p1", Err(api_error()))
            .with_page_link("p2", Err(api_error()));

        let err = discover(&provider, &ctx(), &PipelineConfig::default()).await.unwrap_err();
        assert_eq!(err.cause().kind(), FailureKind::UpstreamUnavailable);
    }
}
