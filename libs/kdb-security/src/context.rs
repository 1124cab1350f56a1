use std::collections::BTreeSet;
use std::sync::Arc;

use crate::access_mode::AccessMode;
use crate::constants::ADMIN_ROLE;
use crate::error::SecurityError;
use crate::identity::Identity;
use crate::privilege::OperationClass;
use crate::scope::{Resource, Scope};

/// What a [`SecurityContext`] was granted.
///
/// A closed sum type: every enforcement point matches it exhaustively, so
/// forgetting the anonymous case is a compile error rather than a hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// No successful authentication. Zero privileges.
    Anonymous,
    /// Authenticated subject with resolved roles.
    Authenticated {
        roles: Arc<BTreeSet<String>>,
        access_mode: AccessMode,
        is_admin: bool,
    },
}

/// `SecurityContext` is the per-transaction authorization handle.
///
/// Produced by [`LoginContext::authorize`](crate::LoginContext::authorize) at
/// transaction begin and consulted by every enforcement point. Immutable:
/// gaining or losing privileges means building a new context on a new
/// transaction, never mutating one that concurrent code may already hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    subject: Arc<Identity>,
    scope: Scope,
    grant: Grant,
}

impl SecurityContext {
    /// The anonymous context for the given scope.
    ///
    /// Used when a transaction begins without authentication or when
    /// authentication failed. Never satisfies any permission check.
    #[must_use]
    pub fn anonymous(scope: Scope) -> Self {
        Self {
            subject: Arc::new(Identity::anonymous()),
            scope,
            grant: Grant::Anonymous,
        }
    }

    /// Full-access context for internal system operations.
    #[must_use]
    pub fn system() -> Self {
        let mut roles = BTreeSet::new();
        roles.insert(ADMIN_ROLE.to_owned());
        Self {
            subject: Arc::new(Identity::system()),
            scope: Scope::Dbms,
            grant: Grant::Authenticated {
                roles: Arc::new(roles),
                access_mode: AccessMode::full(),
                is_admin: true,
            },
        }
    }

    pub(crate) fn authenticated(
        subject: Arc<Identity>,
        scope: Scope,
        roles: Arc<BTreeSet<String>>,
        access_mode: AccessMode,
        is_admin: bool,
    ) -> Self {
        Self {
            subject,
            scope,
            grant: Grant::Authenticated {
                roles,
                access_mode,
                is_admin,
            },
        }
    }

    /// The subject this context acts for.
    #[must_use]
    pub fn subject(&self) -> &Identity {
        &self.subject
    }

    /// The scope requested when this context was authorized.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// The resolved access mode. Anonymous contexts have none.
    #[must_use]
    pub fn access_mode(&self) -> AccessMode {
        match &self.grant {
            Grant::Anonymous => AccessMode::none(),
            Grant::Authenticated { access_mode, .. } => *access_mode,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        match &self.grant {
            Grant::Anonymous => false,
            Grant::Authenticated { is_admin, .. } => *is_admin,
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self.grant, Grant::Anonymous)
    }

    /// Role names held by the subject. Empty for anonymous contexts.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        match &self.grant {
            Grant::Anonymous => Vec::new(),
            Grant::Authenticated { roles, .. } => roles.iter().map(String::as_str).collect(),
        }
    }

    /// Returns `true` if the subject holds the named role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        match &self.grant {
            Grant::Anonymous => false,
            Grant::Authenticated { roles, .. } => roles.contains(role),
        }
    }

    /// Authorization decision for `op` on `resource`.
    ///
    /// Bounded, non-blocking and total. The resource must lie inside the
    /// context's scope and the access mode must grant the operation class.
    #[must_use]
    pub fn allows(&self, op: OperationClass, resource: &Resource) -> bool {
        match &self.grant {
            Grant::Anonymous => false,
            Grant::Authenticated { access_mode, .. } => {
                self.scope.covers(resource) && access_mode.permits(op, resource)
            }
        }
    }

    /// Returns `true` if this context acts for the same subject as `other`.
    ///
    /// Anonymous contexts are never the same subject as anything, including
    /// another anonymous context.
    #[must_use]
    pub fn is_same_subject(&self, other: &Self) -> bool {
        match (&self.grant, &other.grant) {
            (Grant::Authenticated { .. }, Grant::Authenticated { .. }) => {
                self.subject == other.subject
            }
            (Grant::Anonymous, _) | (_, Grant::Anonymous) => false,
        }
    }

    /// Like [`allows`](Self::allows), as a `Result` for enforcement points.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::PermissionDenied`] when the check fails.
    pub fn require(
        &self,
        op: OperationClass,
        resource: &Resource,
        action: &str,
    ) -> Result<(), SecurityError> {
        if self.allows(op, resource) {
            Ok(())
        } else {
            tracing::debug!(
                subject = %self.subject,
                op = %op,
                resource = %resource,
                action,
                "permission denied"
            );
            Err(SecurityError::permission_denied(action))
        }
    }

    /// A context for the same subject and grant, scoped differently.
    ///
    /// Returns a new instance; the receiver is unchanged.
    #[must_use]
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            subject: Arc::clone(&self.subject),
            scope,
            grant: self.grant.clone(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::privilege::Privileges;
    use crate::scope::DatabaseName;

    fn db(name: &str) -> DatabaseName {
        DatabaseName::new(name).unwrap()
    }

    fn ctx(name: &str, privileges: Privileges, scope: Scope) -> SecurityContext {
        SecurityContext::authenticated(
            Arc::new(Identity::authenticated(name).unwrap()),
            scope,
            Arc::new(BTreeSet::from(["custom".to_owned()])),
            AccessMode::from_privileges(privileges),
            false,
        )
    }

    #[test]
    fn anonymous_context_allows_nothing() {
        let anon = SecurityContext::anonymous(Scope::Dbms);
        assert!(anon.is_anonymous());
        assert!(!anon.is_admin());
        assert!(anon.access_mode().is_none());
        assert!(anon.roles().is_empty());
        for op in OperationClass::ALL {
            assert!(!anon.allows(op, &Resource::Dbms));
            assert!(!anon.allows(op, &Resource::Database(db("movies"))));
        }
    }

    #[test]
    fn anonymous_is_never_same_subject() {
        let a = SecurityContext::anonymous(Scope::Dbms);
        let b = SecurityContext::anonymous(Scope::Dbms);
        assert!(!a.is_same_subject(&b));
        assert!(!a.is_same_subject(&a));
    }

    #[test]
    fn scope_confines_authenticated_context() {
        let c = ctx("alice", Privileges::READ, Scope::Database(db("movies")));
        assert!(c.allows(OperationClass::Read, &Resource::Database(db("movies"))));
        assert!(!c.allows(OperationClass::Read, &Resource::Database(db("payroll"))));
        assert!(!c.allows(OperationClass::Write, &Resource::Database(db("movies"))));
    }

    #[test]
    fn require_reports_fixed_denial() {
        let c = ctx("alice", Privileges::READ, Scope::Dbms);
        assert!(c.require(OperationClass::Read, &Resource::Dbms, "read").is_ok());
        let err = c
            .require(OperationClass::Admin, &Resource::Dbms, "create_user")
            .unwrap_err();
        assert_eq!(err.to_string(), crate::PERMISSION_DENIED);
    }

    #[test]
    fn with_scope_returns_new_instance() {
        let c = ctx("alice", Privileges::READ, Scope::Database(db("movies")));
        let other = c.with_scope(Scope::Database(db("payroll")));
        assert!(c.allows(OperationClass::Read, &Resource::Database(db("movies"))));
        assert!(!other.allows(OperationClass::Read, &Resource::Database(db("movies"))));
        assert!(c.is_same_subject(&other));
    }

    #[test]
    fn user_named_system_is_not_the_system_subject() {
        let user = ctx(crate::SYSTEM_PRINCIPAL, Privileges::READ, Scope::Dbms);
        let sys = SecurityContext::system();
        assert!(!user.is_same_subject(&sys));
        assert!(!sys.is_same_subject(&user));
        assert!(sys.is_same_subject(&SecurityContext::system()));
    }

    #[test]
    fn system_context_has_full_access() {
        let sys = SecurityContext::system();
        assert!(sys.is_admin());
        assert!(sys.access_mode().is_full());
        assert!(sys.allows(OperationClass::Admin, &Resource::Database(db("movies"))));
        assert!(sys.has_role(ADMIN_ROLE));
    }
}
