//! `CredentialVerifier` implementation for the static verifier.

use async_trait::async_trait;
use authn_resolver_sdk::{AuthNResolverError, AuthenticationResult, CredentialVerifier, Credentials};

use super::service::Service;

#[async_trait]
impl CredentialVerifier for Service {
    fn name(&self) -> &str {
        Service::name(self)
    }

    fn priority(&self) -> i16 {
        Service::priority(self)
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, AuthNResolverError> {
        self.verify(credentials)
    }
}
