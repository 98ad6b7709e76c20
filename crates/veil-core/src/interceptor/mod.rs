//! Transparent encryption in front of a host's storage primitives.
//!
//! [`Interceptor`] decorates a [`Storage`] implementation:
//!
//! - `read` returns plaintext for encrypted notes while a password is held
//! - `write` encrypts notes carrying the private marker before they reach disk
//! - everything else passes through byte-for-byte
//!
//! It also drives the password lifecycle (`unlock`, `lock`,
//! `change_password`, `reconcile`, `shutdown`).
//!
//! ## Re-entrancy
//!
//! Some hosts route the layer's own raw writes back through their public
//! write path (sync plugins, editor autosave echoes). Two process-wide flags
//! guard against that: while a decrypt is in flight nested reads return
//! stored content, and while the layer is writing on its own behalf nested
//! writes go straight to storage. No mutex is held across a call into the
//! host, so a re-entrant host cannot deadlock the layer either.

mod lifecycle;
mod report;
mod rotation;
mod session;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use crate::crypto::{is_encrypted, CipherEngine};
use crate::error::{Result, VeilError};
use crate::options::VeilOptions;
use crate::storage::{PasswordPrompt, PasswordRequest, PromptPurpose, Storage};
use crate::tracker::PathTracker;

pub use report::{BatchReport, FileIssue, SessionStatus, UnlockReport};
pub use session::SessionState;

use session::{Keys, Session};

/// Holds a process-wide "in flight" flag for as long as it lives.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Encryption layer wrapping raw storage `S`, prompting through `P`.
pub struct Interceptor<S, P> {
    storage: S,
    prompt: P,
    engine: CipherEngine,
    options: VeilOptions,
    session: Mutex<Session>,
    tracker: Mutex<PathTracker>,
    decrypting: AtomicBool,
    encrypting: AtomicBool,
}

impl<S: Storage, P: PasswordPrompt> Interceptor<S, P> {
    /// Wrap `storage` using the wire-format KDF work factor.
    pub fn new(storage: S, prompt: P, options: VeilOptions) -> Result<Self> {
        Self::with_engine(storage, prompt, options, CipherEngine::new())
    }

    /// Wrap `storage` with a caller-supplied engine.
    pub fn with_engine(
        storage: S,
        prompt: P,
        options: VeilOptions,
        engine: CipherEngine,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            storage,
            prompt,
            engine,
            options,
            session: Mutex::new(Session::new()),
            tracker: Mutex::new(PathTracker::new()),
            decrypting: AtomicBool::new(false),
            encrypting: AtomicBool::new(false),
        })
    }

    /// The wrapped raw storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn options(&self) -> &VeilOptions {
        &self.options
    }

    pub fn engine(&self) -> &CipherEngine {
        &self.engine
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tracker(&self) -> MutexGuard<'_, PathTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn keys(&self) -> Option<Keys> {
        self.session().keys()
    }

    fn require_keys(&self) -> Result<Keys> {
        self.keys()
            .ok_or_else(|| VeilError::InvalidState("vault is not unlocked".to_string()))
    }

    fn batch_guard(&self) -> Result<FlagGuard<'_>> {
        FlagGuard::acquire(&self.encrypting).ok_or_else(|| {
            VeilError::InvalidState("another encryption pass is already running".to_string())
        })
    }

    pub fn is_unlocked(&self) -> bool {
        self.session().state() == SessionState::Unlocked
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.tracker().is_tracked(path)
    }

    pub fn tracked_paths(&self) -> Vec<String> {
        self.tracker().all_tracked()
    }

    pub fn status(&self) -> SessionStatus {
        let session = self.session();
        SessionStatus {
            state: session.state(),
            tracked: self.tracker().len(),
            rotation_pending: session.rotation_pending(),
            locked_out: session.locked_out(),
        }
    }

    /// Read `path`, decrypting it when it is ciphertext and a password is held.
    ///
    /// Decryption failures never surface: the stored content is returned and
    /// a warning logged, so an undecryptable note cannot break unrelated
    /// callers.
    pub fn read(&self, path: &str) -> Result<String> {
        let Some(keys) = self.keys() else {
            return self.storage.read(path);
        };
        let Some(_in_flight) = FlagGuard::acquire(&self.decrypting) else {
            tracing::debug!(path, "Re-entrant read; returning stored content");
            return self.storage.read(path);
        };

        let content = self.storage.read(path)?;
        if !is_encrypted(&content) {
            if self.options.is_content_path(path) && self.options.has_marker(&content) {
                self.tracker().mark_private(path);
            }
            return Ok(content);
        }

        match self.decrypt_with_fallback(&content, &keys) {
            Ok(plaintext) => {
                self.tracker().mark_private(path);
                Ok(plaintext)
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "Could not decrypt note; returning stored content");
                Ok(content)
            }
        }
    }

    /// Write `content` to `path`, encrypting it if it carries the marker.
    ///
    /// Writing plaintext without the marker to a tracked note untracks it.
    pub fn write(&self, path: &str, content: &str) -> Result<()> {
        if !self.options.is_content_path(path) || is_encrypted(content) {
            return self.storage.write(path, content);
        }

        if !self.options.has_marker(content) {
            if self.tracker().unmark_private(path) {
                tracing::info!(path, "Private marker removed; storing note as plaintext");
            }
            return self.storage.write(path, content);
        }

        let Some(keys) = self.keys() else {
            return self.storage.write(path, content);
        };
        let Some(_in_flight) = FlagGuard::acquire(&self.encrypting) else {
            tracing::debug!(path, "Re-entrant write; passing through");
            return self.storage.write(path, content);
        };

        let blob = self.engine.encrypt(content, &keys.current)?;
        self.storage.write(path, &blob)?;
        self.tracker().mark_private(path);
        tracing::debug!(path, "Encrypted note on write");
        Ok(())
    }

    /// Decrypt under the current password, then the retained previous one.
    fn decrypt_with_fallback(&self, blob: &str, keys: &Keys) -> Result<String> {
        match (self.engine.decrypt(blob, &keys.current), &keys.previous) {
            (Err(VeilError::Authentication), Some(previous)) => {
                self.engine.decrypt(blob, previous)
            }
            (result, _) => result,
        }
    }

    /// Every content note whose stored form is ciphertext.
    ///
    /// Unreadable notes are recorded in `report` and left out.
    fn scan_encrypted(&self, report: &mut BatchReport) -> Result<Vec<(String, String)>> {
        let mut found = Vec::new();
        for path in self.storage.list_text_files()? {
            if !self.options.is_content_path(&path) {
                continue;
            }
            match self.storage.read(&path) {
                Ok(content) if is_encrypted(&content) => found.push((path, content)),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not read note");
                    report.fail(path, err);
                }
            }
        }
        tracing::debug!(count = found.len(), "Scanned for encrypted notes");
        Ok(found)
    }

    /// Whether `path` still holds `expected`. Prompts run between a scan and
    /// its write-back, so a note may have been saved in the meantime.
    fn still_holds(&self, path: &str, expected: &str) -> Result<bool> {
        Ok(self.storage.read(path)? == expected)
    }

    fn ask(
        &self,
        purpose: PromptPurpose,
        attempt: u32,
        message: impl Into<String>,
    ) -> Result<Option<Zeroizing<String>>> {
        let request = PasswordRequest::new(purpose, attempt, message);
        Ok(self
            .prompt
            .prompt_password(&request)?
            .map(|secret| Zeroizing::new(secret.expose_secret().to_string())))
    }
}

impl<S: Storage, P: PasswordPrompt> Storage for Interceptor<S, P> {
    fn read(&self, path: &str) -> Result<String> {
        Interceptor::read(self, path)
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        Interceptor::write(self, path, content)
    }

    fn list_text_files(&self) -> Result<Vec<String>> {
        self.storage.list_text_files()
    }
}

impl<S, P> Drop for Interceptor<S, P> {
    fn drop(&mut self) {
        let session = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if session.state() == SessionState::Unlocked {
            tracing::warn!(
                "Interceptor dropped while unlocked; private notes decrypted at unlock remain plaintext until the next lock"
            );
        }
    }
}
