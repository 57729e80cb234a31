//! Resolution pipeline.
//!
//! Runs the strategies in fixed order, fetches the listing of whichever
//! account was resolved, and normalizes it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::ResolutionError;
use crate::normalizer::normalize_listing;
use crate::provider::ContentProvider;
use crate::strategy::{self, bounded, try_in_order, StrategyError};
use crate::types::{
    AccountHandle, CredentialContext, ResolutionOutcome, StrategyAttempt, StrategyKind,
};

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Budget for every single provider call (default: 10s).
    pub call_timeout: Duration,
    /// Query page links concurrently during linked-account discovery.
    pub concurrent_page_lookups: bool,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `RESOLVER_CALL_TIMEOUT_SECS` and `RESOLVER_CONCURRENT_PAGE_LOOKUPS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            call_timeout: std::env::var("RESOLVER_CALL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.call_timeout),
            concurrent_page_lookups: std::env::var("RESOLVER_CONCURRENT_PAGE_LOOKUPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.concurrent_page_lookups),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            concurrent_page_lookups: false,
        }
    }
}

/// Account resolution pipeline.
///
/// ## Algorithm
///
/// 1. Direct probe: fetch the subject's listing with the credential as-is.
///    Any 2xx listing, even empty, ends resolution.
/// 2. Linked-account discovery: enumerate the subject's pages and take the
///    first one carrying a linked content account.
/// 3. Aggregated scan: one identity query with nested page links.
/// 4. Fetch the resolved account's listing and normalize it.
///
/// Every strategy failure falls through to the next one. The last failure
/// is surfaced; earlier ones are kept as diagnostics only. The pipeline
/// holds no state between runs.
pub struct ResolutionPipeline<P: ContentProvider + ?Sized> {
    provider: Arc<P>,
    config: PipelineConfig,
}

impl<P: ContentProvider + ?Sized> ResolutionPipeline<P> {
    /// Create a pipeline over a provider.
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// The provider backing this pipeline.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve the content account behind `ctx` and return its video items.
    pub async fn resolve(&self, ctx: &CredentialContext) -> ResolutionOutcome {
        self.resolve_with_cancel(ctx, &CancellationToken::new()).await
    }

    /// Like [`resolve`](Self::resolve), aborting as soon as `cancel` fires.
    ///
    /// A cancelled run returns immediately with `FailureKind::Cancelled` and
    /// never starts the remaining strategies.
    pub async fn resolve_with_cancel(
        &self,
        ctx: &CredentialContext,
        cancel: &CancellationToken,
    ) -> ResolutionOutcome {
        let started = Instant::now();

        let chain = try_in_order(&StrategyKind::ORDER, |kind| self.guarded(kind, ctx, cancel)).await;

        let attempts: Vec<StrategyAttempt> = chain
            .failures
            .iter()
            .map(|(kind, e)| {
                let cause = e.cause();
                StrategyAttempt {
                    strategy: *kind,
                    failure: cause.kind(),
                    reason: cause.to_string(),
                }
            })
            .collect();

        let Some((kind, handle)) = chain.resolved else {
            let error = chain
                .failures
                .last()
                .map(|(_, e)| e.cause())
                .unwrap_or_else(|| ResolutionError::NoLinkedAccount("no strategy attempted".to_string()));
            tracing::warn!(
                subject_id = ctx.subject_id(),
                token = %ctx.access_token(),
                error = %error,
                attempts = attempts.len(),
                latency_ms = started.elapsed().as_millis() as u64,
                "Resolution failed"
            );
            return ResolutionOutcome::failed(None, &error, attempts);
        };

        let listing = match handle {
            AccountHandle::Listing(listing) => listing,
            AccountHandle::Account(account_id) => {
                match self.fetch_account(kind, &account_id, ctx, cancel).await {
                    Ok(listing) => listing,
                    Err(error) => {
                        tracing::warn!(
                            strategy = %kind,
                            account_id = %account_id,
                            error = %error,
                            "Media fetch for resolved account failed"
                        );
                        return ResolutionOutcome::failed(Some(kind), &error, attempts);
                    }
                }
            }
        };

        let mut normalized = normalize_listing(&listing);
        normalized.items.truncate(ctx.limit() as usize);

        tracing::info!(
            strategy = %kind,
            items = normalized.items.len(),
            skipped = normalized.skipped,
            dropped = normalized.dropped,
            latency_ms = started.elapsed().as_millis() as u64,
            "Resolution succeeded"
        );

        ResolutionOutcome::resolved(kind, normalized.items, normalized.skipped, attempts)
    }

    async fn guarded(
        &self,
        kind: StrategyKind,
        ctx: &CredentialContext,
        cancel: &CancellationToken,
    ) -> Result<AccountHandle, StrategyError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StrategyError::Cancelled),
            result = strategy::attempt(kind, &*self.provider, ctx, &self.config) => result,
        }
    }

    async fn fetch_account(
        &self,
        kind: StrategyKind,
        account_id: &str,
        ctx: &CredentialContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<serde_json::Value>, ResolutionError> {
        let fetch = bounded(self.config.call_timeout, self.provider.fetch_account_media(account_id, ctx));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ResolutionError::Cancelled),
            result = fetch => result.map_err(|e| e.classify(kind)),
        }
    }
}

impl<P: ContentProvider + ?Sized> Clone for ResolutionPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}
