use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ANONYMOUS_PRINCIPAL, SYSTEM_PRINCIPAL};
use crate::error::SecurityError;

/// Outcome of the credential check that produced an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationOutcome {
    /// Credentials were verified.
    Success,
    /// Credentials were presented and rejected.
    Failure,
    /// No credentials were checked (anonymous access).
    NotAttempted,
}

/// An authenticated principal: name plus authentication outcome.
///
/// Created once by a credential verifier and never mutated. Equality covers
/// every field, so a real principal named `"anonymous"` or `"system"` is never
/// equal to the anonymous or system identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    name: String,
    outcome: AuthenticationOutcome,
    /// Set only by [`Identity::system`]; never deserialized.
    #[serde(skip)]
    internal: bool,
}

impl Identity {
    /// Create an identity.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EmptyPrincipal`] if `name` is empty or blank.
    pub fn new(name: impl Into<String>, outcome: AuthenticationOutcome) -> Result<Self, SecurityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SecurityError::EmptyPrincipal);
        }
        Ok(Self {
            name,
            outcome,
            internal: false,
        })
    }

    /// Identity of a principal whose credentials were verified.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::EmptyPrincipal`] if `name` is empty or blank.
    pub fn authenticated(name: impl Into<String>) -> Result<Self, SecurityError> {
        Self::new(name, AuthenticationOutcome::Success)
    }

    /// The unauthenticated principal.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            name: ANONYMOUS_PRINCIPAL.to_owned(),
            outcome: AuthenticationOutcome::NotAttempted,
            internal: false,
        }
    }

    /// Principal used by internal system operations.
    ///
    /// Distinct from any verifier-produced identity, including one named
    /// [`SYSTEM_PRINCIPAL`].
    #[must_use]
    pub fn system() -> Self {
        Self {
            name: SYSTEM_PRINCIPAL.to_owned(),
            outcome: AuthenticationOutcome::Success,
            internal: true,
        }
    }

    #[must_use]
    pub fn is_system(&self) -> bool {
        self.internal
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn outcome(&self) -> AuthenticationOutcome {
        self.outcome
    }

    /// Returns `true` only when the credential check succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.outcome == AuthenticationOutcome::Success
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_principal() {
        assert_eq!(
            Identity::authenticated("  ").unwrap_err(),
            SecurityError::EmptyPrincipal
        );
        assert_eq!(
            Identity::new("", AuthenticationOutcome::Failure).unwrap_err(),
            SecurityError::EmptyPrincipal
        );
    }

    #[test]
    fn anonymous_is_not_authenticated() {
        let anon = Identity::anonymous();
        assert_eq!(anon.name(), ANONYMOUS_PRINCIPAL);
        assert_eq!(anon.outcome(), AuthenticationOutcome::NotAttempted);
        assert!(!anon.is_authenticated());
    }

    #[test]
    fn user_named_anonymous_differs_from_anonymous_identity() {
        let user = Identity::authenticated(ANONYMOUS_PRINCIPAL).unwrap();
        assert_ne!(user, Identity::anonymous());
    }

    #[test]
    fn user_named_system_differs_from_system_identity() {
        let user = Identity::authenticated(SYSTEM_PRINCIPAL).unwrap();
        assert_ne!(user, Identity::system());
        assert!(Identity::system().is_system());
        assert!(!user.is_system());

        let round_trip: Identity =
            serde_json::from_str(&serde_json::to_string(&Identity::system()).unwrap()).unwrap();
        assert!(!round_trip.is_system());
    }

    #[test]
    fn failed_identity_keeps_name() {
        let failed = Identity::new("mallory", AuthenticationOutcome::Failure).unwrap();
        assert_eq!(failed.to_string(), "mallory");
        assert!(!failed.is_authenticated());
    }
}
