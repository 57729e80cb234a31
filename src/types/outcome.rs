//! Terminal value of a resolution run.

use serde::{Deserialize, Serialize};

use super::account::StrategyKind;
use super::media::NormalizedMediaItem;
use crate::error::{FailureKind, ResolutionError};

/// One failed strategy attempt, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    /// Strategy that was tried.
    pub strategy: StrategyKind,
    /// Failure classification.
    pub failure: FailureKind,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of [`ResolutionPipeline::resolve`](crate::ResolutionPipeline::resolve).
///
/// Ownership passes to the caller, which serializes it for its own wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub success: bool,
    pub items: Vec<NormalizedMediaItem>,
    /// Strategy that produced the items. Set on success, and on failures
    /// that happen after an account was resolved.
    pub strategy_used: Option<StrategyKind>,
    /// Surfaced failure reason: the last attempted step.
    pub diagnostic: Option<String>,
    /// Classification of the surfaced failure.
    pub failure: Option<FailureKind>,
    /// Earlier failed attempts, not meant for end users.
    pub attempts: Vec<StrategyAttempt>,
    /// Records dropped because they could not be ingested.
    pub skipped_records: usize,
}

impl ResolutionOutcome {
    /// Successful outcome.
    pub fn resolved(
        strategy: StrategyKind,
        items: Vec<NormalizedMediaItem>,
        skipped_records: usize,
        attempts: Vec<StrategyAttempt>,
    ) -> Self {
        Self {
            success: true,
            items,
            strategy_used: Some(strategy),
            diagnostic: None,
            failure: None,
            attempts,
            skipped_records,
        }
    }

    /// Failed outcome surfacing `error`.
    pub fn failed(
        strategy: Option<StrategyKind>,
        error: &ResolutionError,
        attempts: Vec<StrategyAttempt>,
    ) -> Self {
        Self {
            success: false,
            items: Vec::new(),
            strategy_used: strategy,
            diagnostic: Some(error.to_string()),
            failure: Some(error.kind()),
            attempts,
            skipped_records: 0,
        }
    }
}
