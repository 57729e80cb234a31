//! Aggregated account scan: one identity query with nested page links.

use super::{bounded, StrategyError};
use crate::error::ResolutionError;
use crate::pipeline::PipelineConfig;
use crate::provider::ContentProvider;
use crate::types::{AccountHandle, CredentialContext, StrategyKind};

/// Take the first linked account among the aggregate query's pages.
pub async fn scan<P: ContentProvider + ?Sized>(
    provider: &P,
    ctx: &CredentialContext,
    config: &PipelineConfig,
) -> Result<AccountHandle, StrategyError> {
    tracing::debug!(token = %ctx.access_token(), "Running aggregate account scan");

    let links = bounded(config.call_timeout, provider.aggregate_links(ctx))
        .await
        .map_err(|e| StrategyError::Inapplicable(e.classify(StrategyKind::Aggregated)))?;

    let scanned = links.len();
    links
        .into_iter()
        .find_map(|link| link.linked_account_id.filter(|id| !id.is_empty()))
        .map(|account_id| {
            tracing::info!(account_id = %account_id, "Linked account found by aggregate scan");
            AccountHandle::Account(account_id)
        })
        .ok_or_else(|| {
            StrategyError::Exhausted(ResolutionError::NoLinkedAccount(format!(
                "aggregate scan of {} pages found no linked content account",
                scanned
            )))
        })
}
