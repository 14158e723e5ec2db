//! Authenticated caller identity
//!
//! Built once per request by the authentication layer and passed by
//! reference into every evaluator. Nothing here is mutated after
//! construction.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{ROLE_ADMIN, ROLE_DEPT_MANAGER, ROLE_EMPLOYEE, ROLE_HR_ADMIN};
use crate::scope::DataScope;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    HrAdmin,
    DeptManager,
    Employee,
    /// Any role code without built-in rules; handled like `Employee`
    Custom(String),
}

impl Role {
    pub fn parse(code: &str) -> Self {
        match code {
            ROLE_ADMIN => Role::Admin,
            ROLE_HR_ADMIN => Role::HrAdmin,
            ROLE_DEPT_MANAGER => Role::DeptManager,
            ROLE_EMPLOYEE => Role::Employee,
            other => Role::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::HrAdmin => ROLE_HR_ADMIN,
            Role::DeptManager => ROLE_DEPT_MANAGER,
            Role::Employee => ROLE_EMPLOYEE,
            Role::Custom(code) => code.as_str(),
        }
    }

    /// Admin and HR admin see and edit everything
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::HrAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(d)?;
        Ok(Role::parse(&code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub data_scope: DataScope,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub can_view_sensitive: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role, data_scope: DataScope) -> Self {
        Caller {
            user_id: user_id.into(),
            role,
            data_scope,
            employee_id: None,
            department_id: None,
            permissions: BTreeSet::new(),
            can_view_sensitive: false,
        }
    }

    pub fn with_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(perms.into_iter().map(Into::into));
        self
    }

    pub fn with_sensitive_view(mut self, allowed: bool) -> Self {
        self.can_view_sensitive = allowed;
        self
    }
}
