pub use crate::{
    AccessMode, Identity, LoginContext, OperationClass, PERMISSION_DENIED, Resource, RoleRegistry,
    Scope, SecurityContext, SecurityError,
};
