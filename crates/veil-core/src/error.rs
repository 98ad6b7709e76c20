//! Error types for Veil core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer will map these
//! to user-friendly messages.

use thiserror::Error;

/// Result type alias for Veil operations.
pub type Result<T> = std::result::Result<T, VeilError>;

/// Core error type for Veil operations.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Decrypt was called on content that does not carry the blob header
    #[error("Content is not encrypted")]
    NotEncrypted,

    /// Blob carries the header but its body is structurally invalid
    #[error("Malformed encrypted blob: {0}")]
    MalformedBlob(String),

    /// Integrity tag did not verify (wrong password or corrupted data)
    #[error("Incorrect password or corrupted data")]
    Authentication,

    /// Encryption or key derivation error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// I/O error from a filesystem-backed store
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Storage backend error reported by a non-filesystem host
    #[error("Storage error: {0}")]
    Storage(String),

    /// Path does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation is not valid in the current session state
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// The user dismissed a password prompt
    #[error("Password entry cancelled")]
    Cancelled,

    /// Password verification exhausted its retry budget
    #[error("Too many failed password attempts ({0})")]
    TooManyAttempts(u32),

    /// New password and its confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VeilError {
    /// Whether this error means the password did not authenticate the data.
    pub fn is_authentication(&self) -> bool {
        matches!(self, VeilError::Authentication)
    }
}
