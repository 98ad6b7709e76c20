//! AES-256-GCM encryption of single notes under a password.

use std::sync::{Mutex, MutexGuard, PoisonError};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::Rng;

use super::blob::{is_encrypted, EncryptedBlob, IV_LENGTH};
use super::key::{derive_key, DerivedKey, KeyCache, PBKDF2_ITERATIONS, SALT_LENGTH};
use crate::error::{Result, VeilError};

/// Password-based note encryption with a per-password key cache.
///
/// The engine itself holds no password. Callers pass one into each
/// operation; the cache only remembers which password its keys belong to.
pub struct CipherEngine {
    iterations: u32,
    cache: Mutex<KeyCache>,
}

impl CipherEngine {
    /// Engine using the wire-format work factor ([`PBKDF2_ITERATIONS`]).
    pub fn new() -> Self {
        Self::with_iterations(PBKDF2_ITERATIONS)
    }

    /// Engine with a different PBKDF2 work factor.
    ///
    /// Blobs produced this way only decrypt with an engine using the same
    /// count, which the wire format does not record. Meant for tests.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            cache: Mutex::new(KeyCache::new()),
        }
    }

    /// PBKDF2 round count in use.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn cache(&self) -> MutexGuard<'_, KeyCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encrypt `plaintext` under `password` with a fresh salt and iv.
    ///
    /// The key for a fresh salt is derived directly and not cached; only
    /// keys for blobs already on disk are worth keeping.
    ///
    /// # Examples
    ///
    /// ```
    /// use veil_core::crypto::{is_encrypted, CipherEngine};
    ///
    /// let engine = CipherEngine::with_iterations(1_000);
    /// let blob = engine.encrypt("secret note", "correct horse").unwrap();
    /// assert!(is_encrypted(&blob));
    /// assert_eq!(engine.decrypt(&blob, "correct horse").unwrap(), "secret note");
    /// ```
    pub fn encrypt(&self, plaintext: &str, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LENGTH];
        let mut iv = [0u8; IV_LENGTH];
        let mut rng = rand::rng();
        rng.fill(&mut salt);
        rng.fill(&mut iv);

        let key = derive_key(password, &salt, self.iterations)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VeilError::Crypto(format!("Invalid AES key: {}", e)))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|e| VeilError::Crypto(format!("Encryption failed: {}", e)))?;

        Ok(EncryptedBlob {
            salt,
            iv,
            ciphertext,
        }
        .to_string())
    }

    /// Decrypt a blob produced by [`CipherEngine::encrypt`].
    ///
    /// # Errors
    ///
    /// - `VeilError::NotEncrypted` if `blob` lacks the header
    /// - `VeilError::MalformedBlob` if the body cannot be parsed, or the
    ///   authenticated payload is not UTF-8
    /// - `VeilError::Authentication` if the tag does not verify; no partial
    ///   plaintext is ever returned
    pub fn decrypt(&self, blob: &str, password: &str) -> Result<String> {
        if !is_encrypted(blob) {
            return Err(VeilError::NotEncrypted);
        }
        let parsed = EncryptedBlob::parse(blob)?;

        let key = self.derive_key(password, &parsed.salt)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VeilError::Crypto(format!("Invalid AES key: {}", e)))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&parsed.iv), parsed.ciphertext.as_slice())
            .map_err(|_| VeilError::Authentication)?;

        String::from_utf8(plaintext)
            .map_err(|_| VeilError::MalformedBlob("payload is not valid UTF-8".to_string()))
    }

    /// Derive (or fetch from cache) the key for `salt` under `password`.
    pub fn derive_key(&self, password: &str, salt: &[u8]) -> Result<DerivedKey> {
        self.cache().get_or_derive(password, salt, self.iterations)
    }

    /// Forget every cached key and the password identity they belong to.
    pub fn clear_key_cache(&self) {
        self.cache().clear();
        tracing::debug!("Key cache cleared");
    }

    /// Number of keys currently cached.
    pub fn cached_keys(&self) -> usize {
        self.cache().len()
    }
}

impl Default for CipherEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherEngine")
            .field("iterations", &self.iterations)
            .field("cached_keys", &self.cached_keys())
            .finish()
    }
}
