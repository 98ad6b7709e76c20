//! Host-facing trait definitions.
//!
//! The `Storage` trait is the host's raw byte-level primitives; the
//! `PasswordPrompt` trait is the host's password-entry surface. Veil wraps the
//! former and calls into the latter, so the interception layer can sit in front
//! of a directory, an in-memory map, or an editor's own document store.

use secrecy::SecretString;

use crate::error::Result;

/// Raw storage primitives of a document store.
///
/// Paths are vault-relative and `/`-separated.
///
/// Implementations must ensure:
/// - `write` replaces the whole file or leaves it untouched, never a prefix
/// - `list_text_files` returns every note that may hold ciphertext
pub trait Storage: Send + Sync {
    /// Read the full text content of `path`.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::NotFound` if the path does not exist, or a
    /// host-specific I/O error if it cannot be read.
    fn read(&self, path: &str) -> Result<String>;

    /// Replace the content of `path`, creating it if needed.
    fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Enumerate candidate text notes.
    fn list_text_files(&self) -> Result<Vec<String>>;
}

/// Why a password is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    /// Verify against existing encrypted notes.
    Unlock,
    /// First password for a vault with no encrypted notes yet.
    Choose,
    /// Repeat of a `Choose` entry.
    Confirm,
    /// Replacement password during rotation.
    NewPassword,
    /// Repeat of a `NewPassword` entry.
    ConfirmNew,
    /// An older password, to recover notes stranded by an interrupted rotation.
    Recover,
}

/// A single password request.
#[derive(Debug, Clone)]
pub struct PasswordRequest {
    pub purpose: PromptPurpose,
    /// 1-based attempt number within the current unlock.
    pub attempt: u32,
    /// Human-readable prompt text.
    pub message: String,
}

impl PasswordRequest {
    pub fn new(purpose: PromptPurpose, attempt: u32, message: impl Into<String>) -> Self {
        Self {
            purpose,
            attempt,
            message: message.into(),
        }
    }
}

/// Password-entry surface supplied by the host.
pub trait PasswordPrompt: Send + Sync {
    /// Ask for a password. `Ok(None)` means the user cancelled.
    fn prompt_password(&self, request: &PasswordRequest) -> Result<Option<SecretString>>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read(&self, path: &str) -> Result<String> {
        (**self).read(path)
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        (**self).write(path, content)
    }

    fn list_text_files(&self) -> Result<Vec<String>> {
        (**self).list_text_files()
    }
}

impl<P: PasswordPrompt + ?Sized> PasswordPrompt for std::sync::Arc<P> {
    fn prompt_password(&self, request: &PasswordRequest) -> Result<Option<SecretString>> {
        (**self).prompt_password(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_definitions_compile() {
        fn _accepts_storage<T: Storage>(_storage: T) {}
        fn _accepts_prompt<T: PasswordPrompt>(_prompt: T) {}
        fn _accepts_dyn(_storage: &dyn Storage, _prompt: &dyn PasswordPrompt) {}
    }

    #[test]
    fn test_request_carries_attempt() {
        let request = PasswordRequest::new(PromptPurpose::Unlock, 2, "Enter password");
        assert_eq!(request.attempt, 2);
        assert_eq!(request.purpose, PromptPurpose::Unlock);
    }
}
