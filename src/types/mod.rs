//! Core types for the resolver.

pub mod credential;
pub mod account;
pub mod media;
pub mod outcome;

pub use credential::{AccessToken, CredentialContext, CredentialError};
pub use account::{AccountHandle, AccountLink, PageRef, StrategyKind};
pub use media::{
    ChildMedia, Children, DirectMediaRecord, LinkedMediaRecord, MalformedRecord,
    MediaType, NormalizedMediaItem, RawMediaRecord, UpstreamMediaKind,
};
pub use outcome::{ResolutionOutcome, StrategyAttempt};
