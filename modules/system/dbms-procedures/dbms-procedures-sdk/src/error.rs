//! Error types for DBMS procedures.

use kdb_security::SecurityError;
use thiserror::Error;

/// Errors returned by DBMS procedures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcedureError {
    /// Authorization failure or misuse of a security context.
    ///
    /// Permission denial renders as the fixed `"Permission denied."` message.
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// The argument is not a query id.
    #[error("invalid query id '{0}'")]
    InvalidQueryId(String),
}

impl ProcedureError {
    #[must_use]
    pub fn permission_denied(action: impl Into<String>) -> Self {
        Self::Security(SecurityError::permission_denied(action))
    }

    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Security(e) if e.is_permission_denied())
    }
}
