#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Kernel RBAC core.
//!
//! Turns an authenticated [`Identity`] into per-transaction authorization
//! decisions:
//!
//! ```text
//! credential verifier → Identity → LoginContext ──authorize(scope)──► SecurityContext
//!                                       │                                  │
//!                                 RoleRegistry (snapshot)          bound to one transaction
//! ```
//!
//! - [`RoleRegistry`] - process-wide role table, published as immutable snapshots
//! - [`AccessMode`] - resolved privilege set, pure and cheap to copy
//! - [`LoginContext`] - per-session factory for [`SecurityContext`]s
//! - [`SecurityContext`] - immutable per-transaction handle consulted by enforcement points
//! - [`TransactionBinding`] - Created/Active/Closed lifecycle of a context inside a transaction
pub mod access_mode;
pub mod binding;
pub mod constants;
pub mod context;
pub mod error;
pub mod identity;
pub mod login;
pub mod prelude;
pub mod privilege;
pub mod role;
pub mod scope;

pub use access_mode::AccessMode;
pub use binding::{BindingState, TransactionBinding};
pub use constants::{ADMIN_ROLE, ANONYMOUS_PRINCIPAL, PERMISSION_DENIED, SYSTEM_PRINCIPAL};
pub use context::{Grant, SecurityContext};
pub use error::SecurityError;
pub use identity::{AuthenticationOutcome, Identity};
pub use login::LoginContext;
pub use privilege::{OperationClass, Privileges};
pub use role::{Role, RoleRegistry, RoleSnapshot};
pub use scope::{DatabaseName, Resource, Scope};
