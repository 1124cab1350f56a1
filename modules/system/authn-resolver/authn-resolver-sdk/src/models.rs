//! Domain models for the `AuthN` resolver module.

use std::collections::BTreeSet;

use kdb_security::Identity;
use secrecy::SecretString;

/// Credentials presented by a client session.
///
/// Secrets are wrapped in `SecretString` so `Debug` redacts them.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Principal name and password (native store, LDAP bind).
    Basic {
        principal: String,
        password: SecretString,
    },
    /// Bearer token issued by an external identity provider.
    Bearer(SecretString),
    /// No credentials presented.
    None,
}

impl Credentials {
    #[must_use]
    pub fn basic(principal: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            principal: principal.into(),
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(SecretString::from(token.into()))
    }

    /// Principal name claimed by the credentials, if any. For logging only.
    #[must_use]
    pub fn claimed_principal(&self) -> Option<&str> {
        match self {
            Self::Basic { principal, .. } => Some(principal),
            Self::Bearer(_) | Self::None => None,
        }
    }

    /// Short credential kind for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
            Self::None => "none",
        }
    }
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// The verified identity.
    pub identity: Identity,
    /// Role names assigned to the identity by the verifier (user store
    /// mapping, directory group mapping, token claims).
    pub roles: BTreeSet<String>,
}

impl AuthenticationResult {
    #[must_use]
    pub fn new<I, S>(identity: Identity, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identity,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let basic = Credentials::basic("alice", "hunter2");
        let bearer = Credentials::bearer("tok-123");
        assert!(!format!("{basic:?}").contains("hunter2"));
        assert!(!format!("{bearer:?}").contains("tok-123"));
    }

    #[test]
    fn claimed_principal_only_for_basic() {
        assert_eq!(
            Credentials::basic("alice", "pw").claimed_principal(),
            Some("alice")
        );
        assert_eq!(Credentials::bearer("t").claimed_principal(), None);
        assert_eq!(Credentials::None.kind(), "none");
    }
}
