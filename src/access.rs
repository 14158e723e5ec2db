//! Access-control facade
//!
//! The one place request handling talks to. Each rule lives in its own
//! module; this type only composes them for a given caller.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::caller::Caller;
use crate::config::Config;
use crate::constants::{OWNER_DEPARTMENT_KEY, OWNER_EMPLOYEE_KEY};
use crate::crypto::CryptoCodec;
use crate::error::{GuardError, Result};
use crate::field_access::{self, EditDecision};
use crate::permission;
use crate::projector::{ProjectionMode, Projector, SensitiveField, UnreadableField, DEFAULT_SENSITIVE_FIELDS};
use crate::scope::{self, classify, RecordOwner, Relationship, ScopePredicate};

/// Display rows produced for one caller
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub records: Vec<Map<String, Value>>,
    pub unreadable: Vec<UnreadableField>,
}

#[derive(Debug)]
pub struct AccessControl {
    codec: CryptoCodec,
    fields: &'static [SensitiveField],
}

impl AccessControl {
    pub fn new(codec: CryptoCodec) -> Self {
        AccessControl { codec, fields: DEFAULT_SENSITIVE_FIELDS }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(CryptoCodec::from_config(cfg)?))
    }

    pub fn with_fields(mut self, fields: &'static [SensitiveField]) -> Self {
        self.fields = fields;
        self
    }

    pub fn codec(&self) -> &CryptoCodec {
        &self.codec
    }

    fn projector(&self) -> Projector<'_> {
        Projector::with_fields(&self.codec, self.fields)
    }

    pub fn require_permission(&self, caller: &Caller, required: &str) -> Result<()> {
        permission::require(caller, required)
    }

    pub fn scope_predicate(&self, caller: &Caller, entity: &str, requested: &BTreeMap<String, String>) -> ScopePredicate {
        scope::resolve_with_filters(caller, entity, requested)
    }

    /// Sensitive values are shown in plaintext to flagged roles and to
    /// anyone looking at their own record.
    pub fn can_view_sensitive(&self, caller: &Caller, owner: &RecordOwner) -> bool {
        caller.can_view_sensitive || classify(caller, owner) == Relationship::Own
    }

    pub fn read_record(&self, caller: &Caller, record: Option<Map<String, Value>>) -> (Option<Map<String, Value>>, Vec<UnreadableField>) {
        let Some(record) = record else { return (None, Vec::new()) };
        let visible = self.can_view_sensitive(caller, &owner_of(&record));
        self.projector().decrypt_record(Some(record), visible)
    }

    /// Project a list of stored rows, deciding visibility row by row
    pub fn read_records(&self, caller: &Caller, records: Option<Vec<Map<String, Value>>>) -> ReadResult {
        let projector = self.projector();
        let mut out = Vec::new();
        let mut unreadable = Vec::new();
        for (i, record) in records.unwrap_or_default().into_iter().enumerate() {
            let visible = self.can_view_sensitive(caller, &owner_of(&record));
            let (projected, failed) = projector.decrypt_record(Some(record), visible);
            unreadable.extend(failed.into_iter().map(|u| UnreadableField { index: Some(i), ..u }));
            out.extend(projected);
        }
        debug!(user = %caller.user_id, count = out.len(), unreadable = unreadable.len(), "records projected");
        ReadResult { records: out, unreadable }
    }

    pub fn editable_fields(&self, caller: &Caller, owner: &RecordOwner) -> EditDecision {
        field_access::editable_fields(caller, owner)
    }

    /// Validate a write body and convert it to its stored form
    pub fn prepare_write(&self, caller: &Caller, owner: &RecordOwner, body: Map<String, Value>) -> Result<Map<String, Value>> {
        field_access::check_write(caller, owner, body.keys().map(String::as_str))?;
        let projection = self.projector().project(Value::Object(body), true, ProjectionMode::Encrypt)?;
        match projection.value {
            Value::Object(m) => Ok(m),
            _ => Ok(Map::new()),
        }
    }

    /// Hash a search term for exact lookup on a searchable sensitive field
    pub fn search_key(&self, field: &str, value: &str) -> Result<String> {
        match self.projector().field(field) {
            Some(f) if f.searchable => Ok(self.codec.hash_for_search(value)),
            _ => Err(GuardError::NotSearchable { field: field.to_string() }),
        }
    }
}

fn id_value(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Owner ids carried by a stored row
pub fn owner_of(record: &Map<String, Value>) -> RecordOwner {
    RecordOwner {
        employee_id: id_value(record, OWNER_EMPLOYEE_KEY),
        department_id: id_value(record, OWNER_DEPARTMENT_KEY),
    }
}
