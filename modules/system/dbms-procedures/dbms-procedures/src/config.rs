//! Configuration for the DBMS procedures.

use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbmsProceduresConfig {
    /// Roles allowed to call `dbms.security.listRoles` in addition to
    /// administrators.
    pub list_roles_allowed: Vec<String>,
}
