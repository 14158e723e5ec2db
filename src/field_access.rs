//! Field editability per role and target record

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::caller::{Caller, Role};
use crate::constants::{FULL_FIELDS, MANAGER_FIELDS, SELF_SERVICE_FIELDS};
use crate::error::{GuardError, Result};
use crate::scope::{classify, RecordOwner, Relationship};

/// Which fields a caller may write on one target record. Computed per
/// request; role and department membership can change between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditDecision {
    pub can_edit: bool,
    pub editable_fields: BTreeSet<String>,
}

impl EditDecision {
    fn deny() -> Self {
        EditDecision { can_edit: false, editable_fields: BTreeSet::new() }
    }

    fn allow(sets: &[&[&str]]) -> Self {
        let editable_fields = sets.iter().flat_map(|s| s.iter()).map(|f| f.to_string()).collect();
        EditDecision { can_edit: true, editable_fields }
    }

    pub fn allows(&self, field: &str) -> bool {
        self.can_edit && self.editable_fields.contains(field)
    }
}

pub fn editable_fields(caller: &Caller, owner: &RecordOwner) -> EditDecision {
    if caller.role.is_privileged() {
        return EditDecision::allow(&[FULL_FIELDS]);
    }
    match (&caller.role, classify(caller, owner)) {
        (Role::DeptManager, Relationship::Own) => EditDecision::allow(&[MANAGER_FIELDS, SELF_SERVICE_FIELDS]),
        (Role::DeptManager, Relationship::SameDepartment) => EditDecision::allow(&[MANAGER_FIELDS]),
        (_, Relationship::Own) => EditDecision::allow(&[SELF_SERVICE_FIELDS]),
        _ => EditDecision::deny(),
    }
}

/// Validate submitted field names against the caller's editable set.
///
/// Every field outside the set is rejected; the error lists them all. A
/// record the caller cannot edit rejects even an empty submission.
pub fn check_write<'a, I>(caller: &Caller, owner: &RecordOwner, submitted: I) -> Result<EditDecision>
where
    I: IntoIterator<Item = &'a str>,
{
    let decision = editable_fields(caller, owner);
    let rejected: BTreeSet<&str> = submitted.into_iter().filter(|f| !decision.allows(f)).collect();
    if rejected.is_empty() {
        if !decision.can_edit {
            warn!(user = %caller.user_id, role = %caller.role, "write to non-editable record rejected");
            return Err(GuardError::RecordNotEditable { role: caller.role.to_string() });
        }
        return Ok(decision);
    }
    let fields: Vec<String> = rejected.into_iter().map(str::to_string).collect();
    warn!(user = %caller.user_id, role = %caller.role, rejected = ?fields, "write rejected");
    Err(GuardError::FieldNotEditable { fields })
}
