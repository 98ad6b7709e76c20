//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use veil_core::VeilError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, vault, note)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong password, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// A batch completed with per-note failures
    PartialFailure { failed: usize },

    /// Storage or crypto failure with no more specific mapping
    Failed(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::PartialFailure { failed } => {
                write!(f, "{} note(s) could not be processed", failed)
            }
            CliError::Failed(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::PartialFailure { .. } => exit_codes::PARTIAL_FAILURE,
            CliError::Failed(_) => 1,
        }
    }
}

impl From<VeilError> for CliError {
    fn from(err: VeilError) -> Self {
        match err {
            VeilError::Authentication => CliError::auth_failed_with_hint(
                "Incorrect password",
                "Hint: Check VEIL_PASSWORD, or unset it to be prompted.",
            ),
            VeilError::TooManyAttempts(n) => CliError::auth_failed_with_hint(
                format!("Too many failed password attempts ({})", n),
                "Hint: Run the command again to retry.",
            ),
            VeilError::NotFound(what) => CliError::not_found(
                format!("Not found: {}", what),
                "Hint: Paths are relative to the vault root.",
            ),
            VeilError::Cancelled => CliError::invalid_input("Password entry cancelled"),
            other @ (VeilError::InvalidInput(_)
            | VeilError::InvalidState(_)
            | VeilError::PasswordMismatch
            | VeilError::Config(_)) => CliError::invalid_input(other.to_string()),
            other => CliError::Failed(other.to_string()),
        }
    }
}

/// Map any error to the code the process should exit with.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    1
}

/// Turn a core error escaping a command into its CLI form.
pub fn classify(err: anyhow::Error) -> anyhow::Error {
    match err.downcast::<VeilError>() {
        Ok(core) => anyhow::Error::new(CliError::from(core)),
        Err(other) => other,
    }
}
