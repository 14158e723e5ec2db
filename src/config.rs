//! Process-wide secrets and storage location
//!
//! Loaded once at start and treated as immutable. Changing the key means
//! re-encrypting every stored ciphertext.

use serde::Deserialize;

use crate::error::{GuardError, Result};

pub const ENV_ENCRYPTION_KEY: &str = "HRGUARD_ENCRYPTION_KEY";
pub const ENV_HASH_SALT: &str = "HRGUARD_HASH_SALT";
pub const ENV_ROLE_DB: &str = "HRGUARD_ROLE_DB";
pub const DEFAULT_ROLE_DB: &str = "./data/roles";

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte key
    pub encryption_key: String,
    pub hash_salt: String,
    #[serde(default = "default_role_db")]
    pub role_db_path: String,
}

fn default_role_db() -> String {
    DEFAULT_ROLE_DB.to_string()
}

impl Config {
    pub fn new(encryption_key: impl Into<String>, hash_salt: impl Into<String>) -> Self {
        Config {
            encryption_key: encryption_key.into(),
            hash_salt: hash_salt.into(),
            role_db_path: default_role_db(),
        }
    }

    pub fn with_role_db(mut self, path: impl Into<String>) -> Self {
        self.role_db_path = path.into();
        self
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let key = lookup(ENV_ENCRYPTION_KEY)
            .ok_or_else(|| GuardError::Config(format!("{} is not set", ENV_ENCRYPTION_KEY)))?;
        let salt = lookup(ENV_HASH_SALT)
            .ok_or_else(|| GuardError::Config(format!("{} is not set", ENV_HASH_SALT)))?;
        let cfg = Config {
            encryption_key: key,
            hash_salt: salt,
            role_db_path: lookup(ENV_ROLE_DB).unwrap_or_else(default_role_db),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.key_bytes()?;
        if self.hash_salt.is_empty() {
            return Err(GuardError::Config("hash salt must not be empty".into()));
        }
        Ok(())
    }

    /// Decode the hex key into raw bytes
    pub fn key_bytes(&self) -> Result<[u8; KEY_LEN]> {
        let raw = hex::decode(self.encryption_key.trim())
            .map_err(|e| GuardError::Config(format!("encryption key is not hex: {}", e)))?;
        raw.as_slice().try_into().map_err(|_| {
            GuardError::Config(format!(
                "encryption key must be {} bytes, got {}",
                KEY_LEN,
                raw.len()
            ))
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"<redacted>")
            .field("hash_salt", &"<redacted>")
            .field("role_db_path", &self.role_db_path)
            .finish()
    }
}
