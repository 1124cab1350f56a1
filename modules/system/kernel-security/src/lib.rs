//! Kernel Security Module
//!
//! Loads the security section of the kernel configuration and wires the
//! pieces that depend on it:
//!
//! - the process-wide [`RoleRegistry`](kdb_security::RoleRegistry), built
//!   from the built-in roles and configured custom roles
//! - the `AuthN` resolver with the static credential verifier
//! - the in-process transaction manager and the DBMS procedures
//!
//! ## Configuration
//!
//! ```yaml
//! rbac:
//!   builtin_roles: true
//!   roles:
//!     - name: auditor
//!       privileges: [read]
//! authn:
//!   verifier_timeout_ms: 5000
//! static_authn:
//!   users:
//!     - name: alice
//!       password: "change-me"
//!       roles: [reader]
//! procedures:
//!   list_roles_allowed: [auditor]
//! ```
//!
//! Every key can be overridden from the environment with the `KDB_` prefix
//! and `__` as the nesting separator, e.g. `KDB_RBAC__BUILTIN_ROLES=false`.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod error;
pub mod module;

pub use config::{KernelSecurityConfig, RbacConfig, RoleConfig};
pub use error::KernelSecurityError;
pub use module::KernelSecurity;
