//! Configuration for the kernel security module.

use std::path::Path;

use dbms_procedures::DbmsProceduresConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use kdb_security::{Privileges, Role, RoleSnapshot, SecurityError};
use serde::Deserialize;
use static_authn_plugin::StaticAuthNPluginConfig;

use authn_resolver::AuthNResolverConfig;

use crate::error::KernelSecurityError;

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "KDB_";
/// Separator between nested keys in environment variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Security section of the kernel configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelSecurityConfig {
    pub rbac: RbacConfig,
    pub authn: AuthNResolverConfig,
    pub static_authn: StaticAuthNPluginConfig,
    pub procedures: DbmsProceduresConfig,
}

impl KernelSecurityConfig {
    /// Load from an optional YAML file, then apply `KDB_` environment
    /// overrides. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` if `path` is given and does not exist
    /// - `Config` if the merged configuration does not deserialize
    pub fn load(path: Option<&Path>) -> Result<Self, KernelSecurityError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                return Err(KernelSecurityError::ConfigNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }
        let cfg: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()?;

        tracing::debug!(
            builtin_roles = cfg.rbac.builtin_roles,
            custom_roles = cfg.rbac.roles.len(),
            users = cfg.static_authn.users.len(),
            tokens = cfg.static_authn.tokens.len(),
            "kernel security configuration loaded"
        );
        Ok(cfg)
    }
}

/// Role table configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RbacConfig {
    /// Start from the built-in role set.
    pub builtin_roles: bool,

    /// Custom roles. A name already used by a built-in role is rejected.
    pub roles: Vec<RoleConfig>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            builtin_roles: true,
            roles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    pub name: String,
    /// Privilege names: `read`, `write`, `schema`, `admin`.
    #[serde(default)]
    pub privileges: Vec<String>,
}

impl RoleConfig {
    /// # Errors
    ///
    /// Returns `InvalidRoleName` or `UnknownPrivilege`.
    pub fn to_role(&self) -> Result<Role, SecurityError> {
        Role::new(self.name.as_str(), Privileges::parse_names(&self.privileges)?)
    }
}

impl RbacConfig {
    /// Roles described by this configuration, built-ins first.
    ///
    /// # Errors
    ///
    /// Returns the first invalid role or privilege name.
    pub fn roles(&self) -> Result<Vec<Role>, SecurityError> {
        let builtin: Vec<Role> = if self.builtin_roles {
            RoleSnapshot::builtin().roles().cloned().collect()
        } else {
            Vec::new()
        };
        let custom = self
            .roles
            .iter()
            .map(RoleConfig::to_role)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(builtin.into_iter().chain(custom).collect())
    }

    /// Build the role snapshot.
    ///
    /// # Errors
    ///
    /// Returns invalid names and duplicate roles.
    pub fn snapshot(&self) -> Result<RoleSnapshot, SecurityError> {
        RoleSnapshot::from_roles(self.roles()?)
    }
}
