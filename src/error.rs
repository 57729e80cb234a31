//! Resolution error taxonomy.

use serde::{Deserialize, Serialize};

/// Classification of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Upstream rejected the token during the direct probe.
    CredentialInvalid,
    /// The page/account graph was walked but holds no content account.
    NoLinkedAccount,
    /// Transport or upstream failure (timeout, 5xx, malformed payload).
    UpstreamUnavailable,
    /// The caller cancelled the run.
    Cancelled,
}

/// Why a resolution step failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Upstream rejected the token outright.
    #[error("credential rejected: {0}")]
    CredentialInvalid(String),
    /// No linked content account reachable from the subject.
    #[error("no linked content account: {0}")]
    NoLinkedAccount(String),
    /// Transport-level or upstream failure.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Cancelled by the caller.
    #[error("resolution cancelled")]
    Cancelled,
}

impl ResolutionError {
    /// Failure classification used for status mapping.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::CredentialInvalid(_) => FailureKind::CredentialInvalid,
            Self::NoLinkedAccount(_) => FailureKind::NoLinkedAccount,
            Self::UpstreamUnavailable(_) => FailureKind::UpstreamUnavailable,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}
