//! Local (in-process) client for the `AuthN` resolver.

use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::{AuthNResolverClient, Credentials};
use kdb_security::LoginContext;

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct AuthNResolverLocalClient {
    svc: Arc<Service>,
}

impl AuthNResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_fallback(credentials: &Credentials, e: &DomainError) {
    tracing::warn!(
        kind = credentials.kind(),
        principal = credentials.claimed_principal(),
        error = %e,
        "Authentication failed, session continues as anonymous"
    );
}

#[async_trait]
impl AuthNResolverClient for AuthNResolverLocalClient {
    async fn login(&self, credentials: &Credentials) -> LoginContext {
        match self.svc.authenticate(credentials).await {
            Ok(result) => LoginContext::new(
                result.identity,
                result.roles,
                Arc::clone(self.svc.registry()),
            ),
            Err(e) => {
                log_fallback(credentials, &e);
                LoginContext::anonymous()
            }
        }
    }
}
