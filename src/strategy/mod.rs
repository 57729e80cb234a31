//! Account resolution strategies.
//!
//! Each strategy tries to turn a [`CredentialContext`] into an
//! [`AccountHandle`]. They are evaluated in [`StrategyKind::ORDER`] by
//! [`try_in_order`], which stops at the first success.

pub mod direct;
pub mod linked;
pub mod aggregated;

use std::future::Future;
use std::time::Duration;

use crate::error::ResolutionError;
use crate::pipeline::PipelineConfig;
use crate::provider::{ContentProvider, ProviderError};
use crate::types::{AccountHandle, CredentialContext, StrategyKind};

/// Why a strategy did not produce a handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// The strategy does not apply to this credential (its entry call failed).
    #[error("{0}")]
    Inapplicable(ResolutionError),
    /// Every sub-path of the strategy was tried without finding an account.
    #[error("{0}")]
    Exhausted(ResolutionError),
    /// The caller cancelled the run.
    #[error("resolution cancelled")]
    Cancelled,
}

impl StrategyError {
    /// Underlying resolution error.
    pub fn cause(&self) -> ResolutionError {
        match self {
            Self::Inapplicable(e) | Self::Exhausted(e) => e.clone(),
            Self::Cancelled => ResolutionError::Cancelled,
        }
    }

    /// Whether later strategies must not run.
    pub fn stops_chain(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result of evaluating a strategy chain.
#[derive(Debug)]
pub struct Chain<T> {
    /// First strategy that succeeded, with its value.
    pub resolved: Option<(StrategyKind, T)>,
    /// Failed attempts, in the order they were tried.
    pub failures: Vec<(StrategyKind, StrategyError)>,
}

/// Evaluate strategies in order, stopping at the first success.
///
/// A cancelled attempt ends the chain without trying the rest.
pub async fn try_in_order<T, F, Fut>(order: &[StrategyKind], mut attempt: F) -> Chain<T>
where
    F: FnMut(StrategyKind) -> Fut,
    Fut: Future<Output = Result<T, StrategyError>>,
{
    let mut failures = Vec::new();

    for &kind in order {
        match attempt(kind).await {
            Ok(value) => {
                return Chain {
                    resolved: Some((kind, value)),
                    failures,
                };
            }
            Err(e) => {
                let stop = e.stops_chain();
                tracing::info!(strategy = %kind, error = %e, "Strategy failed");
                failures.push((kind, e));
                if stop {
                    break;
                }
            }
        }
    }

    Chain { resolved: None, failures }
}

/// Run one provider call under a time budget.
pub(crate) async fn bounded<T, F>(budget: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(budget.as_millis() as u64)),
    }
}

/// Run the strategy named by `kind`.
pub async fn attempt<P: ContentProvider + ?Sized>(
    kind: StrategyKind,
    provider: &P,
    ctx: &CredentialContext,
    config: &PipelineConfig,
) -> Result<AccountHandle, StrategyError> {
    match kind {
        StrategyKind::Direct => direct::probe(provider, ctx, config).await,
        StrategyKind::Linked => linked::discover(provider, ctx, config).await,
        StrategyKind::Aggregated => aggregated::scan(provider, ctx, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_account(reason: &str) -> StrategyError {
        StrategyError::Exhausted(ResolutionError::NoLinkedAccount(reason.to_string()))
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut seen = Vec::new();
        let chain = try_in_order(&StrategyKind::ORDER, |kind| {
            seen.push(kind);
            async move {
                match kind {
                    StrategyKind::Direct => Err(no_account("direct")),
                    _ => Ok(kind),
                }
            }
        })
        .await;

        assert_eq!(chain.resolved, Some((StrategyKind::Linked, StrategyKind::Linked)));
        assert_eq!(chain.failures.len(), 1);
        assert_eq!(seen, vec![StrategyKind::Direct, StrategyKind::Linked]);
    }

    #[tokio::test]
    async fn test_all_failures_are_collected_in_order() {
        let chain: Chain<()> =
            try_in_order(&StrategyKind::ORDER, |kind| async move { Err(no_account(&kind.to_string())) })
                .await;

        assert!(chain.resolved.is_none());
        let kinds: Vec<_> = chain.failures.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, StrategyKind::ORDER.to_vec());
        assert_eq!(
            chain.failures.last().unwrap().1.cause(),
            ResolutionError::NoLinkedAccount("aggregated".to_string())
        );
    }

    #[tokio::test]
    async fn test_cancellation_stops_chain() {
        let chain: Chain<()> =
            try_in_order(&StrategyKind::ORDER, |_| async { Err(StrategyError::Cancelled) }).await;
        assert_eq!(chain.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: Result<(), ProviderError> = bounded(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(ProviderError::Timeout(5)));
    }
}
