//! Domain service for the `AuthN` resolver.

use std::sync::Arc;
use std::time::Duration;

use authn_resolver_sdk::{AuthenticationResult, CredentialVerifier, Credentials};
use kdb_security::RoleRegistry;
use tracing::{debug, info};

use super::error::DomainError;
use crate::config::AuthNResolverConfig;

/// `AuthN` resolver service.
///
/// Holds the credential verifiers sorted by priority and the role registry
/// that login contexts resolve against.
pub struct Service {
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
    registry: Arc<RoleRegistry>,
    verifier_timeout: Duration,
}

impl Service {
    #[must_use]
    pub fn new(registry: Arc<RoleRegistry>, config: &AuthNResolverConfig) -> Self {
        Self {
            verifiers: Vec::new(),
            registry,
            verifier_timeout: config.verifier_timeout(),
        }
    }

    /// Add a verifier. Verifiers are kept ordered by priority; equal
    /// priorities keep registration order.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifiers.push(verifier);
        self.verifiers.sort_by_key(|v| v.priority());
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Verifier names in the order they are tried.
    #[must_use]
    pub fn verifier_names(&self) -> Vec<&str> {
        self.verifiers.iter().map(|v| v.name()).collect()
    }

    /// Run the verifier chain.
    ///
    /// The first verifier that accepts wins. A rejection moves on to the
    /// next verifier; an unavailable, failing, or slow verifier ends the
    /// chain.
    ///
    /// # Errors
    ///
    /// - `NoVerifiers` if the chain is empty
    /// - `Rejected` if every verifier rejected the credentials
    /// - `VerifierUnavailable`, `Timeout`, `Internal` if a verifier could
    ///   not answer
    #[tracing::instrument(skip_all, fields(kind = credentials.kind(), principal = credentials.claimed_principal()))]
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, DomainError> {
        if self.verifiers.is_empty() {
            return Err(DomainError::NoVerifiers);
        }

        let mut last_rejection = String::new();
        for verifier in &self.verifiers {
            let outcome =
                tokio::time::timeout(self.verifier_timeout, verifier.authenticate(credentials))
                    .await
                    .map_err(|_| DomainError::Timeout {
                        verifier: verifier.name().to_owned(),
                    })?;

            match outcome {
                Ok(result) => {
                    info!(
                        verifier = verifier.name(),
                        subject = %result.identity,
                        roles = result.roles.len(),
                        "Credentials accepted"
                    );
                    return Ok(result);
                }
                Err(e) if e.allows_fallthrough() => {
                    debug!(verifier = verifier.name(), error = %e, "Verifier rejected credentials");
                    last_rejection = e.to_string();
                }
                Err(e) => return Err(DomainError::from_verifier(verifier.name(), e)),
            }
        }

        Err(DomainError::Rejected(last_rejection))
    }
}
