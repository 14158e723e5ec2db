//! Persistent role registry
//!
//! Role definitions (data scope, permission list, sensitive-view flag) live
//! in an LMDB environment. The authentication layer turns a stored
//! definition into a [`Caller`] once per request.
//!
//! Storage:
//! - `roles`: role code -> JSON-encoded [`RoleDefinition`]
//! - `meta`: `boot` -> 1 once seeded, `revision` -> mutation counter

use std::collections::BTreeSet;
use std::path::Path;

use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::caller::{Caller, Role};
use crate::config::Config;
use crate::error::{err, GuardError, Result};
use crate::scope::DataScope;

type DbMeta = Database<Str, U64<byteorder::BigEndian>>;

const META_BOOT: &str = "boot";
const META_REVISION: &str = "revision";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub code: String,
    pub data_scope: DataScope,
    pub permissions: BTreeSet<String>,
    pub can_view_sensitive: bool,
}

impl RoleDefinition {
    pub fn new<I, S>(code: &str, data_scope: DataScope, permissions: I, can_view_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleDefinition {
            code: code.to_string(),
            data_scope,
            permissions: permissions.into_iter().map(Into::into).collect(),
            can_view_sensitive,
        }
    }
}

pub struct RoleStore {
    env: Env,
    roles: Database<Str, Str>,
    meta: DbMeta,
}

impl RoleStore {
    /// Open (creating if needed) the registry at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: the environment must not be opened twice in one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(64 << 20)
                .max_dbs(2)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let roles = env.create_database(&mut tx, Some("roles")).map_err(err)?;
        let meta = env.create_database(&mut tx, Some("meta")).map_err(err)?;
        tx.commit().map_err(err)?;
        debug!(path = %path.display(), "role registry opened");
        Ok(RoleStore { env, roles, meta })
    }

    /// Open the registry at the configured path
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::open(&cfg.role_db_path)
    }

    fn read<T, F: FnOnce(&Self, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let tx = self.env.read_txn().map_err(err)?;
        f(self, &tx)
    }

    /// Run `f` in one write transaction. `f` reports whether it changed
    /// anything; only then is the revision bumped.
    fn write<T, F: FnOnce(&Self, &mut RwTxn) -> Result<(T, bool)>>(&self, f: F) -> Result<T> {
        let mut tx = self.env.write_txn().map_err(err)?;
        let (r, changed) = f(self, &mut tx)?;
        if changed {
            let rev = self.meta.get(&tx, META_REVISION).map_err(err)?.unwrap_or(0);
            self.meta.put(&mut tx, META_REVISION, &(rev + 1)).map_err(err)?;
        }
        tx.commit().map_err(err)?;
        Ok(r)
    }

    fn decode(code: &str, raw: &str) -> Result<RoleDefinition> {
        serde_json::from_str(raw).map_err(|e| GuardError::Storage(format!("corrupt role {}: {}", code, e)))
    }

    pub fn is_bootstrapped(&self) -> Result<bool> {
        self.read(|s, tx| Ok(s.meta.get(tx, META_BOOT).map_err(err)?.is_some()))
    }

    /// Seed the registry with `defs`. Fails if already seeded.
    pub fn seed(&self, defs: &[RoleDefinition]) -> Result<()> {
        self.write(|s, tx| {
            if s.meta.get(tx, META_BOOT).map_err(err)?.is_some() {
                return Err(GuardError::AlreadyBootstrapped);
            }
            for d in defs {
                s.put_in(tx, d)?;
            }
            s.meta.put(tx, META_BOOT, &1).map_err(err)?;
            Ok(((), true))
        })?;
        info!(roles = defs.len(), "role registry seeded");
        Ok(())
    }

    fn put_in(&self, tx: &mut RwTxn, def: &RoleDefinition) -> Result<()> {
        let raw = serde_json::to_string(def).map_err(|e| GuardError::Storage(e.to_string()))?;
        self.roles.put(tx, &def.code, &raw).map_err(err)
    }

    /// Insert or replace a role definition
    pub fn put_role(&self, def: &RoleDefinition) -> Result<()> {
        self.write(|s, tx| Ok((s.put_in(tx, def)?, true)))
    }

    pub fn get_role(&self, code: &str) -> Result<Option<RoleDefinition>> {
        self.read(|s, tx| match s.roles.get(tx, code).map_err(err)? {
            Some(raw) => Ok(Some(Self::decode(code, raw)?)),
            None => Ok(None),
        })
    }

    pub fn delete_role(&self, code: &str) -> Result<bool> {
        self.write(|s, tx| {
            let deleted = s.roles.delete(tx, code).map_err(err)?;
            Ok((deleted, deleted))
        })
    }

    /// All role definitions, ordered by code
    pub fn list_roles(&self) -> Result<Vec<RoleDefinition>> {
        self.read(|s, tx| {
            let mut r = Vec::new();
            for item in s.roles.iter(tx).map_err(err)? {
                let (code, raw) = item.map_err(err)?;
                r.push(Self::decode(code, raw)?);
            }
            Ok(r)
        })
    }

    /// Number of committed mutations since the registry was created
    pub fn revision(&self) -> Result<u64> {
        self.read(|s, tx| Ok(s.meta.get(tx, META_REVISION).map_err(err)?.unwrap_or(0)))
    }

    /// Remove every role and the bootstrap marker
    pub fn clear(&self) -> Result<()> {
        self.write(|s, tx| {
            let had_roles = s.roles.len(tx).map_err(err)? > 0;
            s.roles.clear(tx).map_err(err)?;
            let had_boot = s.meta.delete(tx, META_BOOT).map_err(err)?;
            Ok(((), had_roles || had_boot))
        })
    }

    /// Build the caller identity for an authenticated user holding `role`
    pub fn caller_for(
        &self,
        user_id: &str,
        role: &str,
        employee_id: Option<&str>,
        department_id: Option<&str>,
    ) -> Result<Caller> {
        let def = self
            .get_role(role)?
            .ok_or_else(|| GuardError::RoleNotFound { role: role.to_string() })?;
        Ok(Caller {
            user_id: user_id.to_string(),
            role: Role::parse(&def.code),
            data_scope: def.data_scope,
            employee_id: employee_id.map(str::to_string),
            department_id: department_id.map(str::to_string),
            permissions: def.permissions,
            can_view_sensitive: def.can_view_sensitive,
        })
    }
}
