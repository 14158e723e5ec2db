//! Field-level encryption, search hashing and display masking
//!
//! Three representations of one sensitive value:
//! - ciphertext: AES-256-GCM, random nonce per call, base64(nonce || ct || tag)
//! - search hash: hex SHA-256 over salt || plaintext, stable across restarts
//! - mask: fixed per-kind partial obfuscation for display
//!
//! Empty plaintext maps to empty output everywhere.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{Config, KEY_LEN};
use crate::error::{GuardError, Result};

/// Nonce size for AES-256-GCM (96 bits)
pub const NONCE_SIZE: usize = 12;
/// Authentication tag size (128 bits)
pub const TAG_SIZE: usize = 16;

const MASK_CHAR: char = '*';

/// Display masking format for a sensitive field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    /// 11-digit mobile number: 138****8000
    Phone,
    /// 15 or 18 character national ID: first 6 and last 4 kept
    NationalId,
    /// 12-19 digit bank card: first 4 and last 4 kept
    BankCard,
    /// Personal name: first character kept
    Name,
    Generic,
}

/// Encrypts, hashes and masks single field values.
///
/// Holds the process-wide key and salt; immutable after construction and
/// safe to share across threads.
pub struct CryptoCodec {
    cipher: Aes256Gcm,
    salt: Vec<u8>,
}

impl CryptoCodec {
    pub fn new(key: &[u8; KEY_LEN], salt: impl AsRef<[u8]>) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| GuardError::Config(format!("invalid key: {}", e)))?;
        Ok(CryptoCodec { cipher, salt: salt.as_ref().to_vec() })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        Self::new(&cfg.key_bytes()?, cfg.hash_salt.as_bytes())
    }

    /// Encrypt a plaintext value. Each call draws a fresh nonce, so equal
    /// plaintexts produce different ciphertexts.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| GuardError::Encryption(format!("nonce generation failed: {}", e)))?;
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| GuardError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(STANDARD.encode(out))
    }

    /// Decrypt a value produced by [`encrypt`](Self::encrypt).
    ///
    /// A failure here means the stored value is corrupt or was sealed under
    /// another key; it is never a "no value" signal.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }
        let raw = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| GuardError::decryption(format!("invalid encoding: {}", e)))?;
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(GuardError::decryption("ciphertext truncated"));
        }
        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| GuardError::decryption("authentication failed"))?;
        String::from_utf8(plain).map_err(|_| GuardError::decryption("plaintext is not utf-8"))
    }

    /// Deterministic search key for exact-match lookup of an encrypted field
    pub fn hash_for_search(&self, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }
        let mut hasher = Sha256::new();
        hasher.update(&self.salt);
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn mask(&self, plaintext: &str, kind: MaskKind) -> String {
        mask(plaintext, kind)
    }
}

impl std::fmt::Debug for CryptoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CryptoCodec { .. }")
    }
}

/// Mask a value for display. Values whose length does not fit the kind's
/// format are returned unchanged.
pub fn mask(plaintext: &str, kind: MaskKind) -> String {
    let chars: Vec<char> = plaintext.chars().collect();
    let n = chars.len();
    match kind {
        MaskKind::Phone if n == 11 => keep_ends(&chars, 3, 4),
        MaskKind::NationalId if n == 15 || n == 18 => keep_ends(&chars, 6, 4),
        MaskKind::BankCard if (12..=19).contains(&n) => keep_ends(&chars, 4, 4),
        MaskKind::Phone | MaskKind::NationalId | MaskKind::BankCard => plaintext.to_string(),
        MaskKind::Name => match n {
            0 => String::new(),
            1 => MASK_CHAR.to_string(),
            _ => keep_ends(&chars, 1, 0),
        },
        MaskKind::Generic => match n {
            0 => String::new(),
            1 => MASK_CHAR.to_string(),
            2 => keep_ends(&chars, 1, 0),
            _ => keep_ends(&chars, 1, 1),
        },
    }
}

fn keep_ends(chars: &[char], head: usize, tail: usize) -> String {
    let n = chars.len();
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < head || i >= n - tail { *c } else { MASK_CHAR })
        .collect()
}
