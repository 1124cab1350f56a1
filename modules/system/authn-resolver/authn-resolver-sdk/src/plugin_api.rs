//! Plugin API trait for credential verifiers.
//!
//! Verifiers (native user store, LDAP, single sign-on) implement this trait.
//! The resolver holds them in priority order and tries each in turn.

use async_trait::async_trait;

use crate::error::AuthNResolverError;
use crate::models::{AuthenticationResult, Credentials};

/// Plugin API trait for credential verifiers.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Stable verifier name, used in logs.
    fn name(&self) -> &str;

    /// Selection priority (lower = tried first).
    fn priority(&self) -> i16;

    /// Verify credentials and return the identity with its assigned roles.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the credentials are rejected
    /// - `UnsupportedCredentials` if this verifier does not handle the kind
    /// - `ServiceUnavailable` if the backing store is unreachable
    /// - `Internal` for unexpected errors
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, AuthNResolverError>;
}
