//! Roles and the process-wide role registry.
//!
//! The registry publishes immutable [`RoleSnapshot`]s through an
//! [`ArcSwap`]. Readers load the current snapshot without locking; writers
//! build a new snapshot and swap it in. A [`SecurityContext`](crate::SecurityContext)
//! resolves its access mode from the snapshot current at its creation and
//! is never updated afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::access_mode::AccessMode;
use crate::constants::ADMIN_ROLE;
use crate::error::SecurityError;
use crate::privilege::Privileges;

/// Built-in role names.
pub mod builtin {
    pub const READER: &str = "reader";
    pub const EDITOR: &str = "editor";
    pub const PUBLISHER: &str = "publisher";
    pub const ARCHITECT: &str = "architect";
    pub const ADMIN: &str = crate::constants::ADMIN_ROLE;
}

/// A named bundle of privileges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
    privileges: Privileges,
}

impl Role {
    /// Create a role.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::InvalidRoleName`] if the name is empty or
    /// contains whitespace.
    pub fn new(name: impl Into<String>, privileges: Privileges) -> Result<Self, SecurityError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(SecurityError::InvalidRoleName { name });
        }
        Ok(Self { name, privileges })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn privileges(&self) -> Privileges {
        self.privileges
    }
}

/// Immutable view of the role table at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RoleSnapshot {
    version: u64,
    roles: BTreeMap<String, Role>,
}

impl RoleSnapshot {
    /// Snapshot with no roles.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The kernel's built-in role set.
    #[must_use]
    pub fn builtin() -> Self {
        let table = [
            (builtin::READER, Privileges::READ),
            (builtin::EDITOR, Privileges::READ | Privileges::WRITE),
            (builtin::PUBLISHER, Privileges::READ | Privileges::WRITE),
            (
                builtin::ARCHITECT,
                Privileges::READ | Privileges::WRITE | Privileges::SCHEMA,
            ),
            (builtin::ADMIN, Privileges::FULL),
        ];
        let roles = table
            .into_iter()
            .map(|(name, privileges)| {
                (
                    name.to_owned(),
                    Role {
                        name: name.to_owned(),
                        privileges,
                    },
                )
            })
            .collect();
        Self { version: 0, roles }
    }

    /// Build a snapshot from a list of roles.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::DuplicateRole`] if a name appears twice.
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Result<Self, SecurityError> {
        let mut table = BTreeMap::new();
        for role in roles {
            if table.contains_key(role.name()) {
                return Err(SecurityError::DuplicateRole {
                    name: role.name().to_owned(),
                });
            }
            table.insert(role.name().to_owned(), role);
        }
        Ok(Self {
            version: 0,
            roles: table,
        })
    }

    /// Resolve a set of role names into the union of their privileges.
    ///
    /// Unknown names contribute nothing. This tolerates stale assignments
    /// after a role is dropped without ever widening access.
    #[must_use]
    pub fn resolve<I, S>(&self, names: I) -> AccessMode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                let role = self.roles.get(name.as_ref());
                if role.is_none() {
                    tracing::trace!(role = name.as_ref(), "ignoring unknown role");
                }
                role
            })
            .fold(AccessMode::none(), |mode, role| {
                mode.union(AccessMode::from_privileges(role.privileges))
            })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Roles in name order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Monotonic version, incremented on every registry write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` if the administrator role is defined.
    #[must_use]
    pub fn has_admin_role(&self) -> bool {
        self.roles.contains_key(ADMIN_ROLE)
    }

    /// Returns `true` if `names` include the administrator role and that
    /// role, as defined in this snapshot, carries the admin privilege.
    ///
    /// A removed or downgraded administrator role confers nothing.
    #[must_use]
    pub fn grants_admin<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().any(|name| name.as_ref() == ADMIN_ROLE)
            && self
                .roles
                .get(ADMIN_ROLE)
                .is_some_and(|role| role.privileges.contains(Privileges::ADMIN))
    }
}

/// Process-wide role registry.
///
/// Read-mostly: [`RoleRegistry::snapshot`] and [`RoleRegistry::resolve`]
/// never block. Writes are serialized and each publishes a new snapshot.
#[derive(Debug)]
pub struct RoleRegistry {
    current: ArcSwap<RoleSnapshot>,
    write_lock: Mutex<()>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new(RoleSnapshot::builtin())
    }
}

impl RoleRegistry {
    #[must_use]
    pub fn new(snapshot: RoleSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RoleSnapshot> {
        self.current.load_full()
    }

    /// Resolve role names against the current snapshot.
    #[must_use]
    pub fn resolve<I, S>(&self, names: I) -> AccessMode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.current.load().resolve(names)
    }

    /// Replace the whole role table. Returns the new snapshot version.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::DuplicateRole`] if a name appears twice; the
    /// current snapshot is left untouched.
    pub fn reload(&self, roles: impl IntoIterator<Item = Role>) -> Result<u64, SecurityError> {
        let next = RoleSnapshot::from_roles(roles)?;
        let version = self.publish(|_| next.roles);
        tracing::info!(version, "role registry reloaded");
        Ok(version)
    }

    /// Add a role or replace the privileges of an existing one.
    pub fn upsert_role(&self, role: Role) -> u64 {
        let name = role.name().to_owned();
        let version = self.publish(|current| {
            let mut roles = current.roles.clone();
            roles.insert(role.name().to_owned(), role);
            roles
        });
        tracing::info!(role = %name, version, "role upserted");
        version
    }

    /// Remove a role. Returns `false` if it did not exist.
    pub fn remove_role(&self, name: &str) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.current.load_full();
        if !current.roles.contains_key(name) {
            return false;
        }
        let mut roles = current.roles.clone();
        roles.remove(name);
        let version = current.version + 1;
        self.current.store(Arc::new(RoleSnapshot { version, roles }));
        tracing::info!(role = name, version, "role removed");
        true
    }

    fn publish(&self, build: impl FnOnce(&RoleSnapshot) -> BTreeMap<String, Role>) -> u64 {
        let _guard = self.write_lock.lock();
        let current = self.current.load_full();
        let version = current.version + 1;
        let roles = build(&current);
        self.current.store(Arc::new(RoleSnapshot { version, roles }));
        version
    }
}
