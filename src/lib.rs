//! # feed-resolver
//!
//! Content-account resolution and media normalization.
//!
//! The resolver answers one question:
//!
//! > Given an opaque access credential, which content account does it reach,
//! > and what short-form video does that account hold?
//!
//! ## Core Contract
//!
//! 1. Locate the content account through one of three strategies, tried in
//!    fixed order: direct probe, linked-account discovery, aggregated scan
//! 2. Fetch the account's media listing
//! 3. Normalize both upstream record shapes into one canonical item type,
//!    keeping only video
//!
//! ## Architecture
//!
//! ```text
//! CredentialContext → ResolutionPipeline → Strategy chain → MediaNormalizer → ResolutionOutcome
//!                              ↓
//!                     ContentProvider (Graph API or in-memory)
//! ```
//!
//! ## Guarantees
//!
//! - Strategies run sequentially; the first success wins
//! - A 2xx empty listing from the direct probe is a success, not a fallback trigger
//! - Normalization preserves upstream order and is pure
//! - No state survives a single resolution run

#![warn(clippy::all)]

pub mod types;
pub mod error;
pub mod provider;
pub mod strategy;
pub mod normalizer;
pub mod pipeline;
pub mod fingerprint;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    AccessToken, AccountHandle, AccountLink, CredentialContext, CredentialError, MediaType,
    NormalizedMediaItem, PageRef, RawMediaRecord, ResolutionOutcome, StrategyAttempt, StrategyKind,
};
pub use error::{FailureKind, ResolutionError};
pub use provider::{ContentProvider, InMemoryContentProvider, ProviderError};
#[cfg(feature = "graph-api")]
pub use provider::{GraphApiConfig, GraphApiProvider};
pub use strategy::{try_in_order, StrategyError};
pub use normalizer::{normalize, normalize_listing, Normalized};
pub use pipeline::{PipelineConfig, ResolutionPipeline};
pub use fingerprint::token_fingerprint;

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};

/// Result-size limit applied when a request does not name one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Upper clamp for requested result sizes.
pub const DEFAULT_MAX_LIMIT: u32 = 100;
