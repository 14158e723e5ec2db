//! Role codes, field sets and storage suffixes

// Role codes
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_HR_ADMIN: &str = "hr_admin";
pub const ROLE_DEPT_MANAGER: &str = "dept_manager";
pub const ROLE_EMPLOYEE: &str = "employee";

/// Grants every permission
pub const GLOBAL_WILDCARD: &str = "*";

// Derived representations of a sensitive field
pub const ENCRYPTED_SUFFIX: &str = "_encrypted";
pub const HASH_SUFFIX: &str = "_hash";

/// Constraint value no stored row ever carries. Used when a scope needs an
/// id the caller does not have.
pub const UNMATCHABLE_ID: &str = "__hrguard_no_match__";

// Record keys identifying the owner of a row
pub const OWNER_EMPLOYEE_KEY: &str = "employee_id";
pub const OWNER_DEPARTMENT_KEY: &str = "department_id";

/// Every mutable employee field (admin / HR admin)
pub const FULL_FIELDS: &[&str] = &[
    "employee_no",
    "name",
    "gender",
    "birth_date",
    "id_card",
    "phone",
    "email",
    "department_id",
    "position",
    "entry_date",
    "status",
    "employment_type",
    "bank_card",
    "address",
    "emergency_contact",
    "emergency_phone",
];

/// Contact and position fields a department manager may change
pub const MANAGER_FIELDS: &[&str] = &[
    "phone",
    "email",
    "position",
    "emergency_contact",
    "emergency_phone",
];

/// Contact and address fields an employee may change on their own record
pub const SELF_SERVICE_FIELDS: &[&str] = &[
    "phone",
    "email",
    "address",
    "emergency_contact",
    "emergency_phone",
];

pub fn encrypted_key(field: &str) -> String {
    format!("{}{}", field, ENCRYPTED_SUFFIX)
}

pub fn hash_key(field: &str) -> String {
    format!("{}{}", field, HASH_SUFFIX)
}
