use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::SecurityContext;
use crate::identity::Identity;
use crate::role::RoleRegistry;
use crate::scope::Scope;

#[derive(Debug, Clone)]
enum LoginKind {
    Anonymous,
    Authenticated { registry: Arc<RoleRegistry> },
}

/// Per-session result of authentication.
///
/// Holds the identity and the role names assigned to it, and acts as the
/// factory for per-transaction [`SecurityContext`]s. Immutable for the
/// whole session.
#[derive(Debug, Clone)]
pub struct LoginContext {
    subject: Arc<Identity>,
    roles: Arc<BTreeSet<String>>,
    kind: LoginKind,
}

impl LoginContext {
    /// Login context for an identity and its assigned roles.
    ///
    /// Identities that did not authenticate successfully produce an
    /// anonymous login: their roles are discarded and every context they
    /// authorize has no access.
    #[must_use]
    pub fn new<I, S>(subject: Identity, roles: I, registry: Arc<RoleRegistry>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !subject.is_authenticated() {
            tracing::warn!(
                subject = %subject,
                outcome = ?subject.outcome(),
                "login without successful authentication, using anonymous access"
            );
            return Self {
                subject: Arc::new(subject),
                ..Self::anonymous()
            };
        }

        let roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        Self {
            subject: Arc::new(subject),
            roles: Arc::new(roles),
            kind: LoginKind::Authenticated { registry },
        }
    }

    /// The anonymous login: no roles, no access.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject: Arc::new(Identity::anonymous()),
            roles: Arc::new(BTreeSet::new()),
            kind: LoginKind::Anonymous,
        }
    }

    #[must_use]
    pub fn subject(&self) -> &Identity {
        &self.subject
    }

    /// Role names assigned at authentication time.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Whether contexts authorized now would carry the administrator flag.
    ///
    /// Evaluated against the current role table, so it follows role
    /// changes made after login.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        match &self.kind {
            LoginKind::Anonymous => false,
            LoginKind::Authenticated { registry } => {
                registry.snapshot().grants_admin(self.roles.iter())
            }
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self.kind, LoginKind::Anonymous)
    }

    /// Authorize a transaction in `scope`.
    ///
    /// Never fails: anonymous logins yield [`SecurityContext::anonymous`].
    /// The access mode and the administrator flag are resolved from the
    /// role snapshot current at this call and stay fixed for the context's
    /// lifetime.
    #[must_use]
    pub fn authorize(&self, scope: &Scope) -> SecurityContext {
        match &self.kind {
            LoginKind::Anonymous => SecurityContext::anonymous(scope.clone()),
            LoginKind::Authenticated { registry } => {
                let snapshot = registry.snapshot();
                let access_mode = snapshot.resolve(self.roles.iter());
                let is_admin = snapshot.grants_admin(self.roles.iter());
                tracing::debug!(
                    subject = %self.subject,
                    scope = %scope,
                    access_mode = %access_mode,
                    is_admin,
                    version = snapshot.version(),
                    "authorized security context"
                );
                SecurityContext::authenticated(
                    Arc::clone(&self.subject),
                    scope.clone(),
                    Arc::clone(&self.roles),
                    access_mode,
                    is_admin,
                )
            }
        }
    }
}
