//! Default role definitions and registry seeding

use crate::constants::{GLOBAL_WILDCARD, ROLE_ADMIN, ROLE_DEPT_MANAGER, ROLE_EMPLOYEE, ROLE_HR_ADMIN};
use crate::error::Result;
use crate::scope::DataScope;
use crate::store::{RoleDefinition, RoleStore};

/// The four built-in roles
pub fn default_roles() -> Vec<RoleDefinition> {
    vec![
        RoleDefinition::new(ROLE_ADMIN, DataScope::All, [GLOBAL_WILDCARD], true),
        RoleDefinition::new(
            ROLE_HR_ADMIN,
            DataScope::All,
            ["employees.*", "departments.*", "reports.*", "attendance.*", "leave.*", "onboarding.*"],
            true,
        ),
        RoleDefinition::new(
            ROLE_DEPT_MANAGER,
            DataScope::Department,
            ["employees.view", "employees.edit", "attendance.view", "leave.view", "leave.approve", "reports.view"],
            false,
        ),
        RoleDefinition::new(
            ROLE_EMPLOYEE,
            DataScope::Own,
            ["employees.view", "attendance.view", "leave.view", "leave.apply"],
            false,
        ),
    ]
}

impl RoleStore {
    /// Seed the registry with the built-in roles. Fails if already seeded.
    pub fn bootstrap(&self) -> Result<()> {
        self.seed(&default_roles())
    }
}
