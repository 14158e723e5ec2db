//! hrguard - sensitive-field protection and role-scoped access control
//!
//! Pure evaluators composed by [`AccessControl`]:
//! - [`crypto`]: encrypt / decrypt / search hash / mask for one field value
//! - [`scope`]: caller data scope -> query predicate
//! - [`permission`]: exact and wildcard permission strings
//! - [`field_access`]: editable fields per role and target record
//! - [`projector`]: stored rows <-> display rows
//!
//! [`RoleStore`] persists role definitions and builds [`Caller`] values.

pub mod access;
pub mod bootstrap;
pub mod caller;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod field_access;
pub mod permission;
pub mod projector;
pub mod scope;
pub mod store;

pub use access::{owner_of, AccessControl, ReadResult};
pub use bootstrap::default_roles;
pub use caller::{Caller, Role};
pub use config::Config;
pub use constants::*;
pub use crypto::{mask, CryptoCodec, MaskKind};
pub use error::{GuardError, Result};
pub use field_access::{check_write, editable_fields, EditDecision};
pub use permission::{has_all, has_any, has_permission, require};
pub use projector::{
    Projection, ProjectionMode, Projector, SensitiveField, UnreadableField, DEFAULT_SENSITIVE_FIELDS,
};
pub use scope::{
    classify, resolve, resolve_with_filters, DataScope, RecordOwner, Relationship, ScopePredicate,
    ScopeViolation,
};
pub use store::{RoleDefinition, RoleStore};
