/// Message carried by every permission-denied failure.
///
/// Calling layers match on this token to present a uniform authorization
/// violation, whichever check failed.
pub const PERMISSION_DENIED: &str = "Permission denied.";

/// Name of the administrator role. A login holding it is an admin.
pub const ADMIN_ROLE: &str = "admin";

/// Principal name of the anonymous (unauthenticated) subject.
pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Principal name used by internal system operations running with full access.
pub const SYSTEM_PRINCIPAL: &str = "system";
