//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, vault, note).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong password, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// A batch finished but some notes could not be processed.
    pub const PARTIAL_FAILURE: i32 = 6;
}

/// Environment variables read by the CLI.
pub mod env_vars {
    /// Config file override.
    pub const CONFIG: &str = "VEIL_CONFIG";

    /// Current vault password.
    pub const PASSWORD: &str = "VEIL_PASSWORD";

    /// Target password for `change-password`.
    pub const NEW_PASSWORD: &str = "VEIL_NEW_PASSWORD";

    /// Older password for `recover`.
    pub const OLD_PASSWORD: &str = "VEIL_OLD_PASSWORD";
}
