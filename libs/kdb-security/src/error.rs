//! Error types for the RBAC core.

use thiserror::Error;

use crate::constants::PERMISSION_DENIED;

/// Errors raised by the RBAC core.
///
/// `PermissionDenied` is the only variant that expresses an authorization
/// decision. The others are configuration or programming errors and must
/// never be turned into a silent allow or deny.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// An enforcement point's predicate evaluated to false.
    ///
    /// Always rendered as [`PERMISSION_DENIED`]; `action` is kept for logs.
    #[error("{}", PERMISSION_DENIED)]
    PermissionDenied {
        /// The guarded action that was refused (e.g. `"kill_query"`).
        action: String,
    },

    /// Identities must carry a principal name.
    #[error("principal name must not be empty")]
    EmptyPrincipal,

    /// A scope token could not be resolved to a known scope.
    #[error("invalid scope '{token}': {reason}")]
    InvalidScope { token: String, reason: String },

    /// A role name appears more than once in a registry load.
    #[error("duplicate role '{name}'")]
    DuplicateRole { name: String },

    /// A role name is empty or otherwise unusable.
    #[error("invalid role name '{name}'")]
    InvalidRoleName { name: String },

    /// A privilege name in configuration is not one of the known classes.
    #[error("unknown privilege '{name}'")]
    UnknownPrivilege { name: String },

    /// The security context was consulted after its transaction closed.
    #[error("security context consulted after transaction close")]
    ContextClosed,
}

impl SecurityError {
    /// Build a permission-denied error for the given action.
    #[must_use]
    pub fn permission_denied(action: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }

    /// Returns `true` for the authorization-violation variant.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}
