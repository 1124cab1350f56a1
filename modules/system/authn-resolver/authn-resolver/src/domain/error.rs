//! Domain errors for the `AuthN` resolver.

use authn_resolver_sdk::AuthNResolverError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("no credential verifiers configured")]
    NoVerifiers,

    #[error("credentials rejected by every verifier: {0}")]
    Rejected(String),

    #[error("verifier '{verifier}' not available: {reason}")]
    VerifierUnavailable { verifier: String, reason: String },

    #[error("verifier '{verifier}' timed out")]
    Timeout { verifier: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub(crate) fn from_verifier(verifier: &str, e: AuthNResolverError) -> Self {
        match e {
            AuthNResolverError::Unauthorized(msg)
            | AuthNResolverError::UnsupportedCredentials(msg) => Self::Rejected(msg),
            AuthNResolverError::ServiceUnavailable(reason) => Self::VerifierUnavailable {
                verifier: verifier.to_owned(),
                reason,
            },
            AuthNResolverError::Internal(msg) => Self::Internal(format!("{verifier}: {msg}")),
        }
    }
}
