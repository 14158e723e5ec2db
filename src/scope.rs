//! Data-scope resolution
//!
//! Turns a caller's data scope into equality constraints the data layer
//! applies to a query. Resolution fails closed: an unknown scope restricts
//! to the caller's own rows, and a missing id restricts to
//! [`UNMATCHABLE_ID`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::caller::Caller;
use crate::constants::UNMATCHABLE_ID;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataScope {
    All,
    Department,
    #[serde(rename = "self")]
    Own,
    /// Missing or unrecognised scope value
    #[default]
    #[serde(other)]
    Unknown,
}

impl DataScope {
    pub fn parse(s: &str) -> Self {
        match s {
            "all" => DataScope::All,
            "department" => DataScope::Department,
            "self" => DataScope::Own,
            _ => DataScope::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataScope::All => "all",
            DataScope::Department => "department",
            DataScope::Own => "self",
            DataScope::Unknown => "unknown",
        }
    }
}

/// Columns an entity is scoped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityColumns {
    pub department: &'static str,
    pub employee: &'static str,
}

const DEFAULT_COLUMNS: EntityColumns = EntityColumns { department: "department_id", employee: "employee_id" };

const ENTITY_COLUMNS: &[(&str, EntityColumns)] = &[
    ("employee", DEFAULT_COLUMNS),
    ("attendance", DEFAULT_COLUMNS),
    ("annual_leave", DEFAULT_COLUMNS),
    ("social_security", DEFAULT_COLUMNS),
    ("business_trip", DEFAULT_COLUMNS),
    ("meal_record", DEFAULT_COLUMNS),
    ("onboarding", DEFAULT_COLUMNS),
    ("department", EntityColumns { department: "id", employee: "manager_id" }),
];

/// Scoping columns for an entity type; unknown entities use the defaults
pub fn columns_for(entity: &str) -> EntityColumns {
    ENTITY_COLUMNS
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, c)| *c)
        .unwrap_or(DEFAULT_COLUMNS)
}

/// A requested filter that was overridden to stay inside the caller's scope.
/// Recorded for audit only, never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeViolation {
    pub column: String,
    pub requested: String,
    pub enforced: String,
}

/// Equality constraints over one entity type. No constraints means
/// unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopePredicate {
    pub entity: String,
    pub constraints: BTreeMap<String, String>,
    #[serde(skip)]
    pub narrowed: Vec<ScopeViolation>,
}

impl ScopePredicate {
    fn new(entity: &str) -> Self {
        ScopePredicate { entity: entity.to_string(), constraints: BTreeMap::new(), narrowed: Vec::new() }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.constraints.get(column).map(String::as_str)
    }

    /// True if a row with the given column values passes every constraint
    pub fn matches<'a, F: Fn(&str) -> Option<&'a str>>(&self, value_of: F) -> bool {
        self.constraints.iter().all(|(col, want)| value_of(col) == Some(want.as_str()))
    }
}

/// How a target record relates to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Own,
    SameDepartment,
    Other,
}

/// Ownership of a target record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOwner {
    pub employee_id: Option<String>,
    pub department_id: Option<String>,
}

impl RecordOwner {
    pub fn new(employee_id: impl Into<String>, department_id: impl Into<String>) -> Self {
        RecordOwner { employee_id: Some(employee_id.into()), department_id: Some(department_id.into()) }
    }
}

fn same(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

/// Classify a record relative to the caller. Absent ids never match.
pub fn classify(caller: &Caller, owner: &RecordOwner) -> Relationship {
    if same(&caller.employee_id, &owner.employee_id) {
        Relationship::Own
    } else if same(&caller.department_id, &owner.department_id) {
        Relationship::SameDepartment
    } else {
        Relationship::Other
    }
}

/// Resolve the caller's scope into a predicate over `entity`
pub fn resolve(caller: &Caller, entity: &str) -> ScopePredicate {
    let cols = columns_for(entity);
    let mut p = ScopePredicate::new(entity);
    let pin = |id: &Option<String>| id.clone().unwrap_or_else(|| UNMATCHABLE_ID.to_string());
    match caller.data_scope {
        DataScope::All => {}
        DataScope::Department => {
            p.constraints.insert(cols.department.to_string(), pin(&caller.department_id));
        }
        DataScope::Own | DataScope::Unknown => {
            p.constraints.insert(cols.employee.to_string(), pin(&caller.employee_id));
        }
    }
    debug!(
        user = %caller.user_id,
        scope = caller.data_scope.as_str(),
        entity,
        constraints = ?p.constraints,
        "resolved data scope"
    );
    p
}

/// Resolve the caller's scope and AND it with filters from the request.
///
/// A requested filter on a column the scope constrains to a different value
/// is replaced by the scope's value.
pub fn resolve_with_filters(caller: &Caller, entity: &str, requested: &BTreeMap<String, String>) -> ScopePredicate {
    let mut p = resolve(caller, entity);
    for (col, val) in requested {
        match p.constraints.get(col) {
            Some(enforced) if enforced != val => {
                warn!(
                    user = %caller.user_id,
                    entity,
                    column = %col,
                    "requested filter outside data scope; narrowed"
                );
                p.narrowed.push(ScopeViolation {
                    column: col.clone(),
                    requested: val.clone(),
                    enforced: enforced.clone(),
                });
            }
            Some(_) => {}
            None => {
                p.constraints.insert(col.clone(), val.clone());
            }
        }
    }
    p
}
