//! Declarative procedure permissions.

use std::collections::BTreeSet;
use std::fmt;

use kdb_security::{Grant, OperationClass, Resource, SecurityContext};

use crate::error::ProcedureError;

/// Names of the built-in administrative procedures.
pub mod names {
    pub const LIST_QUERIES: &str = "dbms.listQueries";
    pub const KILL_QUERY: &str = "dbms.killQuery";
    pub const KILL_QUERIES: &str = "dbms.killQueries";
    pub const LIST_ROLES: &str = "dbms.security.listRoles";
}

/// What a procedure does, and therefore what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureMode {
    Read,
    Write,
    Schema,
    /// Server-wide administration. Requires the administrator flag.
    Dbms,
}

impl ProcedureMode {
    #[must_use]
    pub fn operation_class(self) -> OperationClass {
        match self {
            Self::Read => OperationClass::Read,
            Self::Write => OperationClass::Write,
            Self::Schema => OperationClass::Schema,
            Self::Dbms => OperationClass::Admin,
        }
    }
}

impl fmt::Display for ProcedureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Schema => "SCHEMA",
            Self::Dbms => "DBMS",
        })
    }
}

/// Name, mode and extra allowed roles of a procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSignature {
    name: String,
    mode: ProcedureMode,
    allowed_roles: BTreeSet<String>,
}

impl ProcedureSignature {
    #[must_use]
    pub fn new(name: impl Into<String>, mode: ProcedureMode) -> Self {
        Self {
            name: name.into(),
            mode,
            allowed_roles: BTreeSet::new(),
        }
    }

    /// Roles that may call the procedure regardless of their privileges.
    #[must_use]
    pub fn allow_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mode(&self) -> ProcedureMode {
        self.mode
    }

    #[must_use]
    pub fn allowed_roles(&self) -> &BTreeSet<String> {
        &self.allowed_roles
    }
}

/// Checks a caller against a [`ProcedureSignature`] before dispatch.
pub struct ProcedureGuard;

impl ProcedureGuard {
    /// Decide whether `ctx` may call the procedure on `resource`.
    ///
    /// Anonymous callers are always refused, as is any `resource` outside the
    /// caller's scope. Inside the scope, holding one of the allowed roles is
    /// sufficient. Otherwise `Dbms` procedures need the administrator flag
    /// and the other modes need the matching operation class on `resource`.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` when the call is refused.
    pub fn check(
        ctx: &SecurityContext,
        signature: &ProcedureSignature,
        resource: &Resource,
    ) -> Result<(), ProcedureError> {
        let permitted = match ctx.grant() {
            Grant::Anonymous => false,
            Grant::Authenticated {
                roles, is_admin, ..
            } => {
                (ctx.scope().covers(resource) && !roles.is_disjoint(&signature.allowed_roles))
                    || match signature.mode {
                        ProcedureMode::Dbms => {
                            *is_admin && ctx.allows(OperationClass::Admin, resource)
                        }
                        mode => ctx.allows(mode.operation_class(), resource),
                    }
            }
        };

        if permitted {
            Ok(())
        } else {
            tracing::warn!(
                subject = %ctx.subject(),
                procedure = %signature.name,
                mode = %signature.mode,
                "procedure call refused"
            );
            Err(ProcedureError::permission_denied(signature.name.clone()))
        }
    }
}
