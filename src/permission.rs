//! Permission string evaluation
//!
//! Permissions are `resource.action` strings. A caller satisfies a required
//! permission by holding `*`, the exact string, or `resource.*` for the
//! required string's first segment. Matching is case-sensitive.

use tracing::{debug, warn};

use crate::caller::Caller;
use crate::constants::GLOBAL_WILDCARD;
use crate::error::{GuardError, Result};

/// Check whether `granted` contains a permission satisfying `required`
pub fn matches<'a, I: IntoIterator<Item = &'a str>>(granted: I, required: &str) -> bool {
    let resource = required.split_once('.').map(|(r, _)| r);
    granted.into_iter().any(|g| {
        if g == GLOBAL_WILDCARD || g == required {
            return true;
        }
        match (resource, g.strip_suffix(".*")) {
            (Some(r), Some(prefix)) => r == prefix,
            _ => false,
        }
    })
}

pub fn has_permission(caller: &Caller, required: &str) -> bool {
    let ok = matches(caller.permissions.iter().map(String::as_str), required);
    debug!(user = %caller.user_id, required, granted = ok, "permission check");
    ok
}

pub fn has_any(caller: &Caller, required: &[&str]) -> bool {
    required.iter().any(|r| has_permission(caller, r))
}

pub fn has_all(caller: &Caller, required: &[&str]) -> bool {
    required.iter().all(|r| has_permission(caller, r))
}

/// Fail with `PermissionDenied` unless the caller holds `required`
pub fn require(caller: &Caller, required: &str) -> Result<()> {
    if has_permission(caller, required) {
        Ok(())
    } else {
        warn!(user = %caller.user_id, role = %caller.role, required, "permission denied");
        Err(GuardError::PermissionDenied { required: required.to_string() })
    }
}
