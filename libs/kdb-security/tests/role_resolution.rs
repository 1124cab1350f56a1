#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::thread;

use kdb_security::role::builtin;
use kdb_security::{
    Identity, LoginContext, OperationClass, Privileges, Resource, Role, RoleRegistry,
    RoleSnapshot, Scope,
};

fn all_privilege_sets() -> impl Iterator<Item = Privileges> {
    (0u8..16).map(Privileges::from_bits_truncate)
}

#[test]
fn resolved_mode_grants_exactly_the_role_privileges() {
    for privileges in all_privilege_sets() {
        let snapshot =
            RoleSnapshot::from_roles([Role::new("r", privileges).unwrap()]).unwrap();
        let mode = snapshot.resolve(["r"]);
        for op in OperationClass::ALL {
            assert_eq!(
                mode.permits(op, &Resource::Dbms),
                privileges.grants(op),
                "role with {privileges} resolved wrongly for {op}"
            );
        }
    }
}

#[test]
fn union_never_over_grants() {
    for a in all_privilege_sets() {
        for b in all_privilege_sets() {
            let snapshot = RoleSnapshot::from_roles([
                Role::new("a", a).unwrap(),
                Role::new("b", b).unwrap(),
            ])
            .unwrap();
            let mode = snapshot.resolve(["a", "b"]);
            for op in OperationClass::ALL {
                assert_eq!(mode.permits(op, &Resource::Dbms), (a | b).grants(op));
            }
        }
    }
}

#[test]
fn builtin_role_table_matches_expected_grants() {
    let snapshot = RoleSnapshot::builtin();
    let check = |role: &str, expected: &[OperationClass]| {
        let mode = snapshot.resolve([role]);
        for op in OperationClass::ALL {
            assert_eq!(
                mode.permits(op, &Resource::Dbms),
                expected.contains(&op),
                "{role} / {op}"
            );
        }
    };
    check(builtin::READER, &[OperationClass::Read]);
    check(builtin::EDITOR, &[OperationClass::Read, OperationClass::Write]);
    check(builtin::PUBLISHER, &[OperationClass::Read, OperationClass::Write]);
    check(
        builtin::ARCHITECT,
        &[OperationClass::Read, OperationClass::Write, OperationClass::Schema],
    );
    check(builtin::ADMIN, &OperationClass::ALL);
}

#[test]
fn contexts_keep_their_mode_across_concurrent_reloads() {
    let registry = Arc::new(RoleRegistry::new(
        RoleSnapshot::from_roles([Role::new("etl", Privileges::READ).unwrap()]).unwrap(),
    ));
    let login = LoginContext::new(
        Identity::authenticated("loader").unwrap(),
        ["etl"],
        Arc::clone(&registry),
    );
    let pinned = Arc::new(login.authorize(&Scope::Dbms));

    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..200 {
                let privileges = if i % 2 == 0 {
                    Privileges::FULL
                } else {
                    Privileges::empty()
                };
                registry.upsert_role(Role::new("etl", privileges).unwrap());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let pinned = Arc::clone(&pinned);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    assert!(pinned.allows(OperationClass::Read, &Resource::Dbms));
                    assert!(!pinned.allows(OperationClass::Write, &Resource::Dbms));
                    assert!(!pinned.allows(OperationClass::Admin, &Resource::Dbms));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // last write (i = 199) emptied the role
    assert_eq!(registry.snapshot().version(), 200);
    let fresh = login.authorize(&Scope::Dbms);
    assert!(fresh.access_mode().is_none());
    assert!(pinned.allows(OperationClass::Read, &Resource::Dbms));
}

#[test]
fn redefined_or_missing_admin_role_grants_no_admin_flag() {
    let registry = Arc::new(RoleRegistry::default());
    let login = LoginContext::new(
        Identity::authenticated("root").unwrap(),
        [builtin::ADMIN],
        Arc::clone(&registry),
    );
    assert!(login.authorize(&Scope::Dbms).is_admin());

    registry.upsert_role(Role::new(builtin::ADMIN, Privileges::READ).unwrap());
    let downgraded = login.authorize(&Scope::Dbms);
    assert!(!downgraded.is_admin());
    assert!(downgraded.allows(OperationClass::Read, &Resource::Dbms));
    assert!(!downgraded.allows(OperationClass::Admin, &Resource::Dbms));

    registry
        .reload([Role::new(builtin::READER, Privileges::READ).unwrap()])
        .unwrap();
    let undefined = login.authorize(&Scope::Dbms);
    assert!(!undefined.is_admin());
    assert!(undefined.access_mode().is_none());
}
