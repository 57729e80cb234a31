//! Content provider backends.

pub mod memory;

#[cfg(feature = "graph-api")]
pub mod graph;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ResolutionError;
use crate::types::{AccountLink, CredentialContext, PageRef, StrategyKind};

/// Error returned by a provider call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Upstream rejected the credential (401/403 or an invalid-token error code).
    #[error("unauthorized (status {status}): {message}")]
    Unauthorized {
        /// HTTP status.
        status: u16,
        /// Upstream message.
        message: String,
    },
    /// Any other non-2xx response.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Upstream message.
        message: String,
    },
    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),
    /// Call exceeded its time budget.
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether the credential itself was rejected.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Classify this error in the context of a strategy.
    ///
    /// Only the direct probe reports token rejection as
    /// `CredentialInvalid`; on later hops it is an upstream failure.
    pub fn classify(&self, strategy: StrategyKind) -> ResolutionError {
        match (strategy, self) {
            (StrategyKind::Direct, Self::Unauthorized { .. }) => {
                ResolutionError::CredentialInvalid(self.to_string())
            }
            _ => ResolutionError::UpstreamUnavailable(self.to_string()),
        }
    }
}

/// Upstream content-provider API.
///
/// Implementations own transport concerns (timeouts, signing, retries if
/// any). Listings are returned as raw JSON records; shape detection happens
/// in the normalizer.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch the media listing of `ctx.subject_id()` assuming the credential
    /// is scoped to that content account.
    async fn fetch_direct_media(&self, ctx: &CredentialContext) -> Result<Vec<Value>, ProviderError>;

    /// Fetch the media listing of a linked business content account.
    async fn fetch_account_media(
        &self,
        account_id: &str,
        ctx: &CredentialContext,
    ) -> Result<Vec<Value>, ProviderError>;

    /// List the pages administered by `ctx.subject_id()`, in provider order.
    async fn list_pages(&self, ctx: &CredentialContext) -> Result<Vec<PageRef>, ProviderError>;

    /// Look up the content account linked to one page.
    async fn linked_account(
        &self,
        page_id: &str,
        ctx: &CredentialContext,
    ) -> Result<AccountLink, ProviderError>;

    /// One aggregate identity query returning every page with its nested
    /// linked-account reference, in provider order.
    async fn aggregate_links(&self, ctx: &CredentialContext) -> Result<Vec<AccountLink>, ProviderError>;
}

pub use memory::InMemoryContentProvider;

#[cfg(feature = "graph-api")]
pub use graph::{GraphApiConfig, GraphApiProvider};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_unauthorized_is_credential_invalid_only_for_direct() {
        let err = ProviderError::Unauthorized { status: 401, message: "bad token".into() };
        assert_eq!(err.classify(StrategyKind::Direct).kind(), FailureKind::CredentialInvalid);
        assert_eq!(err.classify(StrategyKind::Linked).kind(), FailureKind::UpstreamUnavailable);
    }

    #[test]
    fn test_transport_errors_are_upstream_unavailable() {
        let err = ProviderError::Timeout(10_000);
        assert_eq!(err.classify(StrategyKind::Direct).kind(), FailureKind::UpstreamUnavailable);
    }
}
