#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use kdb_security::{
    AuthenticationOutcome, DatabaseName, Identity, LoginContext, OperationClass, Resource,
    RoleRegistry, Scope, SecurityContext,
};

fn resources() -> Vec<Resource> {
    vec![
        Resource::Dbms,
        Resource::Database(DatabaseName::new("movies").unwrap()),
        Resource::Database(DatabaseName::new("anonymous").unwrap()),
    ]
}

fn scopes() -> Vec<Scope> {
    vec![
        Scope::Dbms,
        Scope::database("movies").unwrap(),
        Scope::database("anonymous").unwrap(),
    ]
}

#[test]
fn anonymous_factory_never_allows_anything() {
    for scope in scopes() {
        let ctx = SecurityContext::anonymous(scope);
        assert!(!ctx.is_admin());
        for op in OperationClass::ALL {
            for resource in resources() {
                assert!(
                    !ctx.allows(op, &resource),
                    "anonymous allowed {op} on {resource}"
                );
            }
        }
    }
}

#[test]
fn anonymous_login_authorizes_anonymous_contexts() {
    let login = LoginContext::anonymous();
    for scope in scopes() {
        let ctx = login.authorize(&scope);
        assert!(ctx.is_anonymous());
        assert_eq!(ctx.scope(), &scope);
        assert!(ctx.access_mode().is_none());
    }
}

#[test]
fn failed_and_unattempted_identities_degrade_to_anonymous() {
    let registry = Arc::new(RoleRegistry::default());
    for outcome in [
        AuthenticationOutcome::Failure,
        AuthenticationOutcome::NotAttempted,
    ] {
        let identity = Identity::new("eve", outcome).unwrap();
        let login = LoginContext::new(identity, ["admin", "reader"], Arc::clone(&registry));
        let ctx = login.authorize(&Scope::Dbms);
        assert!(ctx.is_anonymous());
        assert!(!ctx.is_admin());
        assert!(
            OperationClass::ALL
                .iter()
                .all(|op| !ctx.allows(*op, &Resource::Dbms))
        );
    }
}
