//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! This module derives AES-256 keys from passwords and memoizes them per salt.
//! Every encrypted note carries its own random salt, so a vault scan decrypts
//! many notes that each need a derivation; the cache turns repeated reads of the
//! same note into a map lookup.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, VeilError};

/// PBKDF2 iteration count used for every blob in the wire format.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length of the per-blob salt in bytes.
pub const SALT_LENGTH: usize = 16;

/// A cryptographic key derived from a password.
///
/// This type ensures that key material is securely zeroized from memory
/// when dropped, reducing the window of exposure.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a password with PBKDF2-HMAC-SHA256.
///
/// # Arguments
///
/// * `password` - The password to derive from
/// * `salt` - Random salt (unique per blob)
/// * `iterations` - PBKDF2 round count ([`PBKDF2_ITERATIONS`] for real blobs)
///
/// # Security
///
/// - Same password + salt always produces same key (deterministic)
/// - Different salt produces different key (salt is stored in the blob)
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(VeilError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    if salt.len() < SALT_LENGTH {
        return Err(VeilError::InvalidInput(format!(
            "Salt must be at least {} bytes",
            SALT_LENGTH
        )));
    }

    if iterations == 0 {
        return Err(VeilError::Crypto(
            "PBKDF2 iteration count must be positive".to_string(),
        ));
    }

    let mut key_bytes = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *key_bytes);

    Ok(DerivedKey::from_bytes(*key_bytes))
}

/// Identity of the password a [`KeyCache`] was filled under.
///
/// Only a SHA-256 digest is kept; the cache never holds the password itself.
type PasswordFingerprint = Zeroizing<[u8; 32]>;

fn fingerprint(password: &str) -> PasswordFingerprint {
    let digest = Sha256::digest(password.as_bytes());
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&digest);
    out
}

/// Salt-keyed memo of derived keys, valid for exactly one password.
///
/// Looking up under a different password than the one the cache was filled
/// under flushes every entry first, so a key derived for one password can
/// never be served for another.
#[derive(Default)]
pub struct KeyCache {
    owner: Option<PasswordFingerprint>,
    keys: HashMap<String, DerivedKey>,
}

impl KeyCache {
    /// Create an empty cache with no password identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached key for `salt`, deriving and storing it on a miss.
    pub fn get_or_derive(
        &mut self,
        password: &str,
        salt: &[u8],
        iterations: u32,
    ) -> Result<DerivedKey> {
        let identity = fingerprint(password);
        if self.owner.as_ref() != Some(&identity) {
            if !self.keys.is_empty() {
                tracing::debug!(entries = self.keys.len(), "Password changed; flushing key cache");
            }
            self.keys.clear();
            self.owner = Some(identity);
        }

        let slot = STANDARD.encode(salt);
        if let Some(key) = self.keys.get(&slot) {
            return Ok(key.clone());
        }

        let key = derive_key(password, salt, iterations)?;
        self.keys.insert(slot, key.clone());
        Ok(key)
    }

    /// Drop every cached key and forget the password identity.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.owner = None;
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the cache holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache")
            .field("entries", &self.keys.len())
            .field("has_owner", &self.owner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = b"unique-salt-1234";

        let key1 = derive_key("test-password", salt, FAST).unwrap();
        let key2 = derive_key("test-password", salt, FAST).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("test-password", b"salt1-1234567890", FAST).unwrap();
        let key2 = derive_key("test-password", b"salt2-1234567890", FAST).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_password_different_key() {
        let salt = b"fixed-salt-12345";

        let key1 = derive_key("password-one", salt, FAST).unwrap();
        let key2 = derive_key("password-two", salt, FAST).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_matches_rfc7914_pbkdf2_sha256_vector() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with P="passwd", S="salt", c=1.
        let key = {
            let mut out = [0u8; KEY_LENGTH];
            pbkdf2::pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);
            out
        };
        assert_eq!(
            hex::encode(key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = derive_key("", b"salt-1234567890123456", FAST);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Password cannot be empty"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = derive_key("test-password", b"short", FAST);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Salt must be at least 16 bytes"));
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("test-password", b"salt-1234567890123456", FAST).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));

        let key_hex = hex::encode(&key.as_bytes()[..4]);
        assert!(!debug_output.contains(&key_hex));
    }

    #[test]
    fn test_cache_returns_identical_key() {
        let mut cache = KeyCache::new();
        let salt = [7u8; SALT_LENGTH];

        let first = cache.get_or_derive("password-one", &salt, FAST).unwrap();
        let second = cache.get_or_derive("password-one", &salt, FAST).unwrap();

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_flushes_on_password_change() {
        let mut cache = KeyCache::new();
        let salt_a = [1u8; SALT_LENGTH];
        let salt_b = [2u8; SALT_LENGTH];

        let old = cache.get_or_derive("password-one", &salt_a, FAST).unwrap();
        cache.get_or_derive("password-one", &salt_b, FAST).unwrap();
        assert_eq!(cache.len(), 2);

        let new = cache.get_or_derive("password-two", &salt_a, FAST).unwrap();
        assert_ne!(old.as_bytes(), new.as_bytes());
        assert_eq!(cache.len(), 1);
        assert_eq!(
            new.as_bytes(),
            derive_key("password-two", &salt_a, FAST).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_cache_clear_forgets_everything() {
        let mut cache = KeyCache::new();
        cache
            .get_or_derive("password-one", &[3u8; SALT_LENGTH], FAST)
            .unwrap();

        cache.clear();

        assert!(cache.is_empty());
        assert!(!format!("{:?}", cache).contains("has_owner: true"));
    }
}
