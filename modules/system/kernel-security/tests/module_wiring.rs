#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The wired module end to end: login, authorize, procedures, role reload.

use std::collections::BTreeMap;

use authn_resolver_sdk::{AuthNResolverClient, Credentials};
use dbms_procedures_sdk::DbmsProceduresClient;
use kdb_security::{DatabaseName, OperationClass, Resource, Scope};
use kernel_security::{KernelSecurity, KernelSecurityConfig, RbacConfig, RoleConfig};
use static_authn_plugin::config::UserEntry;

fn config() -> KernelSecurityConfig {
    let mut cfg = KernelSecurityConfig::default();
    cfg.rbac.roles.push(RoleConfig {
        name: "auditor".to_owned(),
        privileges: vec!["read".to_owned()],
    });
    cfg.static_authn.users = vec![
        UserEntry {
            name: "alice".to_owned(),
            password: "wonderland".to_owned().into(),
            roles: vec!["reader".to_owned()],
        },
        UserEntry {
            name: "root".to_owned(),
            password: "toor".to_owned().into(),
            roles: vec!["admin".to_owned()],
        },
    ];
    cfg
}

#[tokio::test]
async fn login_and_procedures_share_one_registry() {
    let kernel = KernelSecurity::init(&config()).unwrap();

    let alice = kernel.authn().login(&Credentials::basic("alice", "wonderland")).await;
    let root = kernel.authn().login(&Credentials::basic("root", "toor")).await;

    let tx = kernel.transactions().begin(alice.authorize(&Scope::database("movies").unwrap()));
    let query = tx.execute("MATCH (m:Movie) RETURN m", BTreeMap::new()).unwrap();

    let admin_ctx = root.authorize(&Scope::Dbms);
    let rows = kernel.procedures().list_queries(&admin_ctx).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "alice");

    let roles = kernel.procedures().list_roles(&admin_ctx).unwrap();
    assert!(roles.iter().any(|r| r.role == "auditor"));

    let killed = kernel
        .procedures()
        .kill_query(&admin_ctx, &query.id().to_string())
        .unwrap();
    assert!(killed.is_found());
    assert!(query.is_cancelled());
}

#[tokio::test]
async fn reload_applies_to_new_contexts() {
    let kernel = KernelSecurity::init(&config()).unwrap();
    let alice = kernel.authn().login(&Credentials::basic("alice", "wonderland")).await;
    let scope = Scope::database("movies").unwrap();
    let movies = Resource::Database(DatabaseName::new("movies").unwrap());

    let before = alice.authorize(&scope);
    let version = kernel
        .reload_roles(&RbacConfig {
            builtin_roles: false,
            roles: vec![RoleConfig {
                name: "reader".to_owned(),
                privileges: vec!["read".to_owned(), "write".to_owned()],
            }],
        })
        .unwrap();
    let after = alice.authorize(&scope);

    assert_eq!(version, 1);
    assert!(!before.allows(OperationClass::Write, &movies));
    assert!(after.allows(OperationClass::Write, &movies));
}

#[test]
fn invalid_roles_fail_init() {
    let mut cfg = config();
    cfg.rbac.roles.push(RoleConfig {
        name: "admin".to_owned(),
        privileges: vec!["read".to_owned()],
    });

    assert!(KernelSecurity::init(&cfg).is_err());
}

#[tokio::test]
async fn reload_without_admin_role_revokes_admin() {
    let kernel = KernelSecurity::init(&config()).unwrap();
    let alice = kernel.authn().login(&Credentials::basic("alice", "wonderland")).await;
    let root = kernel.authn().login(&Credentials::basic("root", "toor")).await;

    let tx = kernel.transactions().begin(alice.authorize(&Scope::Dbms));
    let query = tx.execute("RETURN 1", BTreeMap::new()).unwrap();

    kernel
        .reload_roles(&RbacConfig {
            builtin_roles: false,
            roles: vec![RoleConfig {
                name: "reader".to_owned(),
                privileges: vec!["read".to_owned()],
            }],
        })
        .unwrap();

    let root_ctx = root.authorize(&Scope::Dbms);
    assert!(!root_ctx.is_admin());
    assert!(kernel.procedures().list_queries(&root_ctx).unwrap().is_empty());
    let err = kernel
        .procedures()
        .kill_query(&root_ctx, &query.id().to_string())
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(!query.is_cancelled());
}
