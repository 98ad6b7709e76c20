//! Password policy for newly chosen passwords.
//!
//! Applied when a vault gets its first password and when a password is
//! rotated. Unlock attempts are never policy-checked: the password that
//! opens existing notes is whatever it already is.

use crate::error::{Result, VeilError};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a new password meets minimum requirements.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At least 8 characters long
///
/// # Examples
///
/// ```
/// use veil_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("my-secure-password-123").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(VeilError::InvalidInput(
            "Password cannot be empty".to_string(),
        ));
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(VeilError::InvalidInput(format!(
            "Password must be at least {} characters (got {})",
            MIN_PASSWORD_LENGTH, length
        )));
    }

    Ok(())
}
