//! Error types for the `AuthN` resolver module.

use thiserror::Error;

/// Errors a credential verifier can report.
///
/// None of these escape a login: the resolver turns every failure into an
/// anonymous login context.
#[derive(Debug, Error)]
pub enum AuthNResolverError {
    /// The credentials are invalid, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The verifier does not handle this kind of credentials.
    #[error("unsupported credentials: {0}")]
    UnsupportedCredentials(String),

    /// The verifier backend (directory, identity provider) is not reachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthNResolverError {
    /// Returns `true` if the next verifier in the chain may still be tried.
    #[must_use]
    pub fn allows_fallthrough(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::UnsupportedCredentials(_))
    }
}
