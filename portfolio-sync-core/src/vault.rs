//! Credential vault
//!
//! AES-256-GCM encryption of credential blobs at rest. A token is the standard base64 encoding
//! of `nonce(12) || ciphertext || tag(16)`; a fresh random nonce is drawn for every call.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;
/// AES-256
pub const KEY_LENGTH: usize = 32;

/// Vault failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum VaultError {
    #[error("Invalid key size: expected {KEY_LENGTH} bytes, got {0}")]
    InvalidKeySize(usize),

    /// Configured key is not valid base64.
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Not base64, or too short to hold a nonce and a tag.
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Authentication tag mismatch: wrong key or tampered token.
    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Encryption failed")]
    EncryptionFailed,
}

/// Symmetric vault holding one immutable key. Cheap to share; safe for concurrent use.
#[derive(Clone)]
pub struct CredentialVault {
    cipher: Aes256Gcm,
}

impl CredentialVault {
    /// Build a vault from a raw 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, VaultError> {
        if key.len() != KEY_LENGTH {
            return Err(VaultError::InvalidKeySize(key.len()));
        }
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::InvalidKeySize(key.len()))?;
        Ok(Self { cipher })
    }

    /// Build a vault from a base64-encoded 32-byte key, as found in configuration.
    pub fn from_base64_key(encoded: &str) -> Result<Self, VaultError> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::InvalidKeyEncoding(e.to_string()))?;
        Self::new(&key)
    }

    /// A fresh random key, base64-encoded, for provisioning a new installation.
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LENGTH];
        rand::rng().fill_bytes(&mut key);
        BASE64.encode(key)
    }

    /// Encrypt `plaintext` into a printable token. `""` maps to `""`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut token = Vec::with_capacity(NONCE_LENGTH + sealed.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&sealed);
        Ok(BASE64.encode(token))
    }

    /// Decrypt a token produced by [`encrypt`](Self::encrypt). `""` maps to `""`.
    pub fn decrypt(&self, token: &str) -> Result<String, VaultError> {
        if token.is_empty() {
            return Ok(String::new());
        }

        let raw = BASE64
            .decode(token)
            .map_err(|e| VaultError::InvalidCiphertext(e.to_string()))?;
        if raw.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(VaultError::InvalidCiphertext(format!(
                "token too short: {} bytes",
                raw.len()
            )));
        }

        let (nonce_bytes, sealed) = raw.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| VaultError::DecryptionFailed)?;

        // Authenticated plaintext always originates from a &str.
        String::from_utf8(plaintext).map_err(|_| VaultError::DecryptionFailed)
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key", &"***")
            .finish()
    }
}
