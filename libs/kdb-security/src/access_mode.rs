use std::fmt;

use crate::privilege::{OperationClass, Privileges};
use crate::scope::Resource;

/// Resolved, queryable permission set of a subject.
///
/// The union of the privileges granted by the subject's roles. Absence of
/// a grant is denial.
///
/// # Examples
///
/// ```
/// use kdb_security::{AccessMode, OperationClass, Privileges, Resource};
///
/// // no access (default)
/// let mode = AccessMode::none();
/// assert!(mode.is_none());
/// assert!(!mode.permits(OperationClass::Read, &Resource::Dbms));
///
/// // read-only
/// let mode = AccessMode::from_privileges(Privileges::READ);
/// assert!(mode.permits(OperationClass::Read, &Resource::Dbms));
/// assert!(!mode.permits(OperationClass::Write, &Resource::Dbms));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessMode {
    privileges: Privileges,
}

impl Default for AccessMode {
    /// Default is no access.
    fn default() -> Self {
        Self::none()
    }
}

impl AccessMode {
    /// The "no access" mode.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            privileges: Privileges::empty(),
        }
    }

    /// The "full access" mode, reserved for internal system operations.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            privileges: Privileges::FULL,
        }
    }

    #[must_use]
    pub const fn from_privileges(privileges: Privileges) -> Self {
        Self { privileges }
    }

    /// Union of two modes.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            privileges: self.privileges.union(other.privileges),
        }
    }

    /// Returns `true` if the mode grants `op`.
    ///
    /// Privileges are coarse operation classes, so the resource does not
    /// narrow the decision here; scope confinement is applied by the
    /// security context.
    #[must_use]
    pub fn permits(&self, op: OperationClass, _resource: &Resource) -> bool {
        self.privileges.grants(op)
    }

    #[inline]
    #[must_use]
    pub const fn privileges(&self) -> Privileges {
        self.privileges
    }

    /// Returns `true` for the no-access mode.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.privileges.is_empty()
    }

    /// Returns `true` for the full-access mode.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.privileges.contains(Privileges::FULL)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.privileges, f)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scope::DatabaseName;

    #[test]
    fn default_is_no_access() {
        let mode = AccessMode::default();
        assert!(mode.is_none());
        assert!(!mode.is_full());
        for op in OperationClass::ALL {
            assert!(!mode.permits(op, &Resource::Dbms));
        }
    }

    #[test]
    fn full_permits_everything() {
        let mode = AccessMode::full();
        let db = Resource::Database(DatabaseName::new("movies").unwrap());
        assert!(mode.is_full());
        for op in OperationClass::ALL {
            assert!(mode.permits(op, &db));
        }
    }

    #[test]
    fn union_combines_grants() {
        let mode = AccessMode::from_privileges(Privileges::READ)
            .union(AccessMode::from_privileges(Privileges::SCHEMA));
        assert!(mode.permits(OperationClass::Read, &Resource::Dbms));
        assert!(mode.permits(OperationClass::Schema, &Resource::Dbms));
        assert!(!mode.permits(OperationClass::Write, &Resource::Dbms));
        assert_eq!(mode.to_string(), "read,schema");
    }
}
