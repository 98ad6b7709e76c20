//! Cryptographic operations for Veil.
//!
//! This module provides note encryption and key derivation using
//! well-audited RustCrypto primitives:
//! - **AES-256-GCM**: authenticated encryption of each note
//! - **PBKDF2-HMAC-SHA256**: 600,000-round password key derivation
//!
//! ## Security Model
//!
//! - Fresh 16-byte salt and 12-byte iv on every encryption
//! - Wrong passwords fail tag verification; garbage is never returned
//! - Derived keys zeroized from memory on drop
//! - Cached keys are bound to the password they were derived under
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the vault directory or a synced copy of it
//! - Offline brute-force attacks on the password
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to process memory while the vault is unlocked
//! - Leakage of note paths, sizes, or timestamps

pub mod blob;
pub mod engine;
pub mod key;
pub mod passphrase;

pub use blob::{is_encrypted, EncryptedBlob, HEADER};
pub use engine::CipherEngine;
pub use key::{derive_key, DerivedKey, KeyCache, PBKDF2_ITERATIONS};
pub use passphrase::validate_passphrase;
