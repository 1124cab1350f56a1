//! Public API trait for the `AuthN` resolver.
//!
//! This trait defines the interface the session layer uses to turn
//! presented credentials into a login context. The resolver implements it
//! and delegates to its credential verifiers.

use async_trait::async_trait;
use kdb_security::LoginContext;

use crate::models::Credentials;

/// Public API trait for the `AuthN` resolver.
///
/// ```ignore
/// let login = authn.login(&Credentials::bearer(token)).await;
/// let ctx = login.authorize(&scope);
/// ```
///
/// # Failure model
///
/// Login never fails. Rejected or unverifiable credentials yield
/// [`LoginContext::anonymous`], whose security contexts have no access.
/// Callers inspect [`LoginContext::is_anonymous`] to decide whether to keep
/// the connection.
#[async_trait]
pub trait AuthNResolverClient: Send + Sync {
    /// Authenticate credentials and return the session's login context.
    async fn login(&self, credentials: &Credentials) -> LoginContext;
}
