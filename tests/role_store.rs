//! Role registry tests

use hrguard::{
    default_roles, has_permission, resolve, Config, DataScope, GuardError, Role, RoleDefinition, RoleStore,
};
use tempfile::TempDir;

fn setup() -> (TempDir, RoleStore) {
    let dir = TempDir::new().unwrap();
    let store = RoleStore::open(dir.path()).unwrap();
    (dir, store)
}

fn setup_bootstrapped() -> (TempDir, RoleStore) {
    let (dir, store) = setup();
    store.bootstrap().unwrap();
    (dir, store)
}

// ============================================================================
// Bootstrap
// ============================================================================

#[test]
fn bootstrap_seeds_default_roles() {
    let (_dir, store) = setup();
    assert!(!store.is_bootstrapped().unwrap());
    store.bootstrap().unwrap();
    assert!(store.is_bootstrapped().unwrap());

    let codes: Vec<String> = store.list_roles().unwrap().into_iter().map(|r| r.code).collect();
    assert_eq!(codes, vec!["admin", "dept_manager", "employee", "hr_admin"]);
    assert_eq!(store.list_roles().unwrap().len(), default_roles().len());
}

#[test]
fn bootstrap_twice_fails() {
    let (_dir, store) = setup_bootstrapped();
    assert_eq!(store.bootstrap(), Err(GuardError::AlreadyBootstrapped));
}

#[test]
fn clear_allows_reseeding() {
    let (_dir, store) = setup_bootstrapped();
    store.clear().unwrap();
    assert!(!store.is_bootstrapped().unwrap());
    assert!(store.list_roles().unwrap().is_empty());
    store.bootstrap().unwrap();
}

// ============================================================================
// CRUD
// ============================================================================

#[test]
fn put_get_delete_role() {
    let (_dir, store) = setup();
    let auditor = RoleDefinition::new("auditor", DataScope::All, ["reports.view"], false);
    store.put_role(&auditor).unwrap();
    assert_eq!(store.get_role("auditor").unwrap(), Some(auditor));
    assert!(store.delete_role("auditor").unwrap());
    assert!(!store.delete_role("auditor").unwrap());
    assert_eq!(store.get_role("auditor").unwrap(), None);
}

#[test]
fn revision_counts_mutations() {
    let (_dir, store) = setup();
    let start = store.revision().unwrap();
    store.put_role(&RoleDefinition::new("a", DataScope::Own, ["x.view"], false)).unwrap();
    store.put_role(&RoleDefinition::new("b", DataScope::Own, ["x.view"], false)).unwrap();
    assert_eq!(store.revision().unwrap(), start + 2);
}

#[test]
fn noop_mutations_keep_revision() {
    let (_dir, store) = setup();
    assert!(!store.delete_role("ghost").unwrap());
    store.clear().unwrap();
    assert_eq!(store.revision().unwrap(), 0);

    store.put_role(&RoleDefinition::new("a", DataScope::Own, ["x.view"], false)).unwrap();
    assert!(store.delete_role("a").unwrap());
    assert_eq!(store.revision().unwrap(), 2);
}

#[test]
fn failed_bootstrap_leaves_registry_untouched() {
    let (_dir, store) = setup_bootstrapped();
    let rev = store.revision().unwrap();
    store.delete_role("employee").unwrap();
    assert_eq!(store.bootstrap(), Err(GuardError::AlreadyBootstrapped));
    assert_eq!(store.get_role("employee").unwrap(), None);
    assert_eq!(store.revision().unwrap(), rev + 1);
}

#[test]
fn concurrent_bootstrap_seeds_once() {
    let (_dir, store) = setup();
    let results: Vec<_> = std::thread::scope(|sc| {
        let handles: Vec<_> = (0..4).map(|_| sc.spawn(|| store.bootstrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().all(|r| r.is_ok() || *r == Err(GuardError::AlreadyBootstrapped)));
    assert_eq!(store.revision().unwrap(), 1);
}

#[test]
fn opens_at_configured_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roles");
    let cfg = Config::new("11".repeat(32), "salt").with_role_db(path.to_string_lossy());
    let store = RoleStore::from_config(&cfg).unwrap();
    store.bootstrap().unwrap();
    assert!(path.exists());
}

#[test]
fn registry_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = RoleStore::open(dir.path()).unwrap();
        store.bootstrap().unwrap();
    }
    let store = RoleStore::open(dir.path()).unwrap();
    assert!(store.is_bootstrapped().unwrap());
    assert!(store.get_role("hr_admin").unwrap().is_some());
}

// ============================================================================
// Caller construction
// ============================================================================

#[test]
fn caller_for_builds_identity_from_definition() {
    let (_dir, store) = setup_bootstrapped();

    let mgr = store.caller_for("u7", "dept_manager", Some("E100"), Some("D1")).unwrap();
    assert_eq!(mgr.role, Role::DeptManager);
    assert_eq!(mgr.data_scope, DataScope::Department);
    assert!(!mgr.can_view_sensitive);
    assert!(has_permission(&mgr, "leave.approve"));
    assert!(!has_permission(&mgr, "employees.delete"));
    assert_eq!(resolve(&mgr, "employee").get("department_id"), Some("D1"));

    let admin = store.caller_for("u1", "admin", None, None).unwrap();
    assert!(admin.can_view_sensitive);
    assert!(has_permission(&admin, "anything.at_all"));
    assert!(resolve(&admin, "employee").is_unrestricted());
}

#[test]
fn caller_for_unknown_role_fails() {
    let (_dir, store) = setup_bootstrapped();
    assert_eq!(
        store.caller_for("u9", "ghost", Some("E9"), None),
        Err(GuardError::RoleNotFound { role: "ghost".into() })
    );
}
