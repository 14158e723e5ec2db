//! PermissionEvaluator tests

use hrguard::{has_all, has_any, has_permission, require, Caller, DataScope, GuardError, Role};

fn caller_with(perms: &[&str]) -> Caller {
    Caller::new("u1", Role::Employee, DataScope::Own).with_permissions(perms.iter().copied())
}

#[test]
fn global_wildcard_grants_everything() {
    let c = caller_with(&["*"]);
    assert!(has_permission(&c, "employees.view_all"));
    assert!(has_permission(&c, "reports.export"));
}

#[test]
fn resource_wildcard_is_scoped_to_resource() {
    let c = caller_with(&["employees.*"]);
    assert!(has_permission(&c, "employees.view_all"));
    assert!(!has_permission(&c, "reports.view_all"));
}

#[test]
fn exact_match() {
    let c = caller_with(&["leave.apply"]);
    assert!(has_permission(&c, "leave.apply"));
    assert!(!has_permission(&c, "leave.approve"));
}

#[test]
fn no_partial_prefix_match() {
    let c = caller_with(&["employees.*"]);
    assert!(!has_permission(&c, "employeesArchive.view"));
    let c = caller_with(&["employees.view"]);
    assert!(!has_permission(&c, "employees.view_all"));
}

#[test]
fn matching_is_case_sensitive() {
    let c = caller_with(&["Employees.*", "leave.Apply"]);
    assert!(!has_permission(&c, "employees.view"));
    assert!(!has_permission(&c, "leave.apply"));
}

#[test]
fn empty_permission_set_denies() {
    let c = caller_with(&[]);
    assert!(!has_permission(&c, "employees.view"));
}

#[test]
fn require_reports_missing_permission() {
    let c = caller_with(&["employees.view"]);
    assert!(require(&c, "employees.view").is_ok());
    assert_eq!(
        require(&c, "employees.delete"),
        Err(GuardError::PermissionDenied { required: "employees.delete".into() })
    );
}

#[test]
fn any_and_all() {
    let c = caller_with(&["attendance.*", "leave.view"]);
    assert!(has_any(&c, &["reports.view", "attendance.export"]));
    assert!(has_all(&c, &["attendance.export", "leave.view"]));
    assert!(!has_all(&c, &["attendance.export", "leave.approve"]));
}

#[test]
fn evaluation_does_not_mutate_caller() {
    let c = caller_with(&["employees.*"]);
    let before = c.clone();
    let _ = has_permission(&c, "employees.view");
    let _ = require(&c, "reports.view");
    assert_eq!(c, before);
}
