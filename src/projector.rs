//! Record projection through the crypto codec
//!
//! Read paths turn stored rows (`{field}_encrypted`, `{field}_hash`) into
//! display rows holding plaintext or masked values. Write paths turn
//! plaintext into the stored representations. Stored representations never
//! leave a read projection.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::constants::{encrypted_key, hash_key};
use crate::crypto::{CryptoCodec, MaskKind};
use crate::error::{GuardError, Result};

/// A field stored encrypted and shown masked by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitiveField {
    pub name: &'static str,
    pub kind: MaskKind,
    /// Whether a search hash is stored alongside the ciphertext
    pub searchable: bool,
}

pub const DEFAULT_SENSITIVE_FIELDS: &[SensitiveField] = &[
    SensitiveField { name: "name", kind: MaskKind::Name, searchable: true },
    SensitiveField { name: "phone", kind: MaskKind::Phone, searchable: true },
    SensitiveField { name: "id_card", kind: MaskKind::NationalId, searchable: true },
    SensitiveField { name: "bank_card", kind: MaskKind::BankCard, searchable: false },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Stored → display
    Decrypt,
    /// Plaintext → stored
    Encrypt,
}

/// A field whose ciphertext could not be decrypted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableField {
    /// Position in the input list; `None` for a single record
    pub index: Option<usize>,
    pub field: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub value: Value,
    pub unreadable: Vec<UnreadableField>,
}

pub struct Projector<'c> {
    codec: &'c CryptoCodec,
    fields: &'c [SensitiveField],
}

impl<'c> Projector<'c> {
    pub fn new(codec: &'c CryptoCodec) -> Self {
        Self::with_fields(codec, DEFAULT_SENSITIVE_FIELDS)
    }

    pub fn with_fields(codec: &'c CryptoCodec, fields: &'c [SensitiveField]) -> Self {
        Projector { codec, fields }
    }

    pub fn field(&self, name: &str) -> Option<&SensitiveField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Project a record, a list of records, or null.
    ///
    /// Lists are projected element-wise; non-object elements pass through.
    /// Decryption failures are reported in [`Projection::unreadable`] and the
    /// field surfaces as null. Encryption failures abort the projection.
    pub fn project(&self, input: Value, can_view_sensitive: bool, mode: ProjectionMode) -> Result<Projection> {
        let mut unreadable = Vec::new();
        let value = match input {
            Value::Null => Value::Null,
            Value::Object(map) => Value::Object(self.project_map(map, None, can_view_sensitive, mode, &mut unreadable)?),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    out.push(match item {
                        Value::Object(map) => {
                            Value::Object(self.project_map(map, Some(i), can_view_sensitive, mode, &mut unreadable)?)
                        }
                        other => other,
                    });
                }
                Value::Array(out)
            }
            other => other,
        };
        Ok(Projection { value, unreadable })
    }

    /// Decrypt-or-mask one stored record. `None` stays `None`.
    pub fn decrypt_record(&self, record: Option<Map<String, Value>>, can_view_sensitive: bool) -> (Option<Map<String, Value>>, Vec<UnreadableField>) {
        let mut unreadable = Vec::new();
        let out = record.map(|m| self.decrypt_map(m, None, can_view_sensitive, &mut unreadable));
        (out, unreadable)
    }

    /// Decrypt-or-mask a list of stored records; `None` becomes an empty list
    pub fn decrypt_records(&self, records: Option<Vec<Map<String, Value>>>, can_view_sensitive: bool) -> (Vec<Map<String, Value>>, Vec<UnreadableField>) {
        let mut unreadable = Vec::new();
        let out = records
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, m)| self.decrypt_map(m, Some(i), can_view_sensitive, &mut unreadable))
            .collect();
        (out, unreadable)
    }

    /// Replace plaintext sensitive fields with their stored representations
    pub fn encrypt_record(&self, record: Map<String, Value>) -> Result<Map<String, Value>> {
        self.encrypt_map(record)
    }

    fn project_map(
        &self,
        map: Map<String, Value>,
        index: Option<usize>,
        can_view: bool,
        mode: ProjectionMode,
        unreadable: &mut Vec<UnreadableField>,
    ) -> Result<Map<String, Value>> {
        match mode {
            ProjectionMode::Decrypt => Ok(self.decrypt_map(map, index, can_view, unreadable)),
            ProjectionMode::Encrypt => self.encrypt_map(map),
        }
    }

    fn decrypt_map(
        &self,
        mut map: Map<String, Value>,
        index: Option<usize>,
        can_view: bool,
        unreadable: &mut Vec<UnreadableField>,
    ) -> Map<String, Value> {
        for f in self.fields {
            let stored = map.remove(&encrypted_key(f.name));
            map.remove(&hash_key(f.name));
            if stored.is_none() && !map.contains_key(f.name) {
                continue;
            }

            let plain = match stored {
                Some(Value::String(ct)) => match self.codec.decrypt(&ct) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        error!(field = f.name, index = ?index, error = %e, "stored value unreadable");
                        let reason = match e {
                            GuardError::Decryption { reason } => reason,
                            other => other.to_string(),
                        };
                        unreadable.push(UnreadableField { index, field: f.name.to_string(), reason });
                        map.insert(f.name.to_string(), Value::Null);
                        continue;
                    }
                },
                // No ciphertext: fall back to a plaintext column if one is present
                Some(Value::Null) | None => match map.get(f.name) {
                    Some(Value::String(p)) => Some(p.clone()),
                    _ => None,
                },
                Some(other) => {
                    error!(field = f.name, index = ?index, found = %json_type(&other), "stored value unreadable");
                    unreadable.push(UnreadableField {
                        index,
                        field: f.name.to_string(),
                        reason: "ciphertext is not a string".to_string(),
                    });
                    map.insert(f.name.to_string(), Value::Null);
                    continue;
                }
            };

            let shown = match plain {
                Some(p) if can_view => Value::String(p),
                Some(p) => Value::String(self.codec.mask(&p, f.kind)),
                None => Value::Null,
            };
            map.insert(f.name.to_string(), shown);
        }
        map
    }

    fn encrypt_map(&self, mut map: Map<String, Value>) -> Result<Map<String, Value>> {
        for f in self.fields {
            let Some(v) = map.remove(f.name) else { continue };
            let plain = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let (ct, hash) = if plain.is_empty() {
                (Value::Null, Value::Null)
            } else {
                (Value::String(self.codec.encrypt(&plain)?), Value::String(self.codec.hash_for_search(&plain)))
            };
            map.insert(encrypted_key(f.name), ct);
            if f.searchable {
                map.insert(hash_key(f.name), hash);
            }
        }
        Ok(map)
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
