//! Error types for hrguard

use thiserror::Error;

/// The main error type for hrguard operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// Ciphertext was tampered with, truncated, or sealed under another key.
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The caller lacks the permission a route requires.
    #[error("permission denied: requires {required}")]
    PermissionDenied { required: String },

    /// Submitted fields outside the caller's editable set, sorted.
    #[error("fields not editable: {}", .fields.join(", "))]
    FieldNotEditable { fields: Vec<String> },

    /// The caller may not edit the target record at all.
    #[error("record not editable by {role}")]
    RecordNotEditable { role: String },

    #[error("field {field} is not searchable")]
    NotSearchable { field: String },

    #[error("role not found: {role}")]
    RoleNotFound { role: String },

    #[error("role registry already bootstrapped")]
    AlreadyBootstrapped,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl GuardError {
    pub(crate) fn decryption(reason: impl Into<String>) -> Self {
        GuardError::Decryption { reason: reason.into() }
    }
}

/// Result type alias for hrguard operations
pub type Result<T> = std::result::Result<T, GuardError>;

/// Convert a storage-layer error to GuardError
pub fn err<E: std::error::Error>(e: E) -> GuardError {
    GuardError::Storage(e.to_string())
}
