//! Caller credentials.

use std::fmt;

use crate::fingerprint::token_fingerprint;

/// Error constructing a [`CredentialContext`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// Access token was empty.
    #[error("access token must not be empty")]
    MissingToken,
    /// Subject id was empty.
    #[error("subject id must not be empty")]
    MissingSubject,
    /// Result-size limit was zero.
    #[error("limit must be greater than zero")]
    ZeroLimit,
}

/// Opaque bearer credential for the content provider.
///
/// `Debug` and `Display` print a fingerprint, never the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for building upstream requests only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Log-safe fingerprint of the token.
    pub fn fingerprint(&self) -> String {
        token_fingerprint(&self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({})", self.fingerprint())
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", self.fingerprint())
    }
}

/// Immutable input to one resolution run.
///
/// `subject_id` is the identity the caller claims; it may be a content
/// account, a user owning pages, or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialContext {
    access_token: AccessToken,
    subject_id: String,
    limit: u32,
}

impl CredentialContext {
    /// Build a context. Rejects empty tokens, empty subjects and a zero limit.
    pub fn new(
        access_token: impl Into<String>,
        subject_id: impl Into<String>,
        limit: u32,
    ) -> Result<Self, CredentialError> {
        let access_token = access_token.into();
        let subject_id = subject_id.into();

        if access_token.trim().is_empty() {
            return Err(CredentialError::MissingToken);
        }
        if subject_id.trim().is_empty() {
            return Err(CredentialError::MissingSubject);
        }
        if limit == 0 {
            return Err(CredentialError::ZeroLimit);
        }

        Ok(Self {
            access_token: AccessToken::new(access_token),
            subject_id,
            limit,
        })
    }

    /// The caller's access token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// The caller-claimed identity.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Maximum number of media records to request and return.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}
