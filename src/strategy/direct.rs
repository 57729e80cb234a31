//! Direct probe: the credential addresses the content account itself.

use super::{bounded, StrategyError};
use crate::pipeline::PipelineConfig;
use crate::provider::ContentProvider;
use crate::types::{AccountHandle, CredentialContext, StrategyKind};

/// Fetch the subject's listing directly.
///
/// Any 2xx listing, empty or not, is a success. A failed call makes the
/// strategy inapplicable.
pub async fn probe<P: ContentProvider + ?Sized>(
    provider: &P,
    ctx: &CredentialContext,
    config: &PipelineConfig,
) -> Result<AccountHandle, StrategyError> {
    tracing::debug!(
        subject_id = ctx.subject_id(),
        token = %ctx.access_token(),
        "Probing direct media access"
    );

    match bounded(config.call_timeout, provider.fetch_direct_media(ctx)).await {
        Ok(listing) => {
            tracing::debug!(records = listing.len(), "Direct probe succeeded");
            Ok(AccountHandle::Listing(listing))
        }
        Err(e) => Err(StrategyError::Inapplicable(e.classify(StrategyKind::Direct))),
    }
}
