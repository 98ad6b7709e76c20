//! # Veil Core
//!
//! Core library for Veil - transparent, tag-driven at-rest encryption for a
//! vault of plain-text notes.
//!
//! Notes containing the private marker are stored as authenticated
//! ciphertext and handed back as plaintext to anything reading through the
//! layer; everything else passes through untouched.
//!
//! ## Architecture
//!
//! - **crypto**: blob format, AES-256-GCM encrypt/decrypt, PBKDF2 key cache
//! - **tracker**: set of paths currently governed by the marker
//! - **storage**: host primitives (`Storage`, `PasswordPrompt`) and backends
//! - **interceptor**: the decorating layer and its password lifecycle
//! - **options**: marker, note extensions, retry budget

pub mod crypto;
pub mod error;
pub mod fs;
pub mod interceptor;
pub mod options;
pub mod storage;
pub mod tracker;

pub use crypto::{is_encrypted, CipherEngine};
pub use error::{Result, VeilError};
pub use interceptor::{
    BatchReport, FileIssue, Interceptor, SessionState, SessionStatus, UnlockReport,
};
pub use options::VeilOptions;
pub use storage::{
    FsStorage, MemoryStorage, PasswordPrompt, PasswordRequest, PromptPurpose, Storage,
};
pub use tracker::PathTracker;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
