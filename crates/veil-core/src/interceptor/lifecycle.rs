//! Unlock, lock and shutdown.

use std::collections::BTreeSet;

use zeroize::Zeroizing;

use super::{BatchReport, Interceptor, Keys, SessionState, UnlockReport};
use crate::crypto::{is_encrypted, validate_passphrase, EncryptedBlob};
use crate::error::{Result, VeilError};
use crate::storage::{PasswordPrompt, PromptPurpose, Storage};

/// Notes tried before a candidate password counts as wrong.
const VERIFY_SAMPLES: usize = 3;

/// Outcome of the password-acquisition phase of an unlock.
struct Acquired {
    password: Zeroizing<String>,
    attempts: u32,
    first_time: bool,
    encrypted: Vec<(String, String)>,
    report: BatchReport,
}

impl<S: Storage, P: PasswordPrompt> Interceptor<S, P> {
    /// Acquire and verify a password, then decrypt every encrypted note in place.
    ///
    /// With no encrypted notes present the entered password becomes the vault
    /// password (asked twice). Otherwise it is verified by trial decryption of
    /// up to three notes, with `max_attempts` tries; it is accepted as soon
    /// as any of them opens.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if already unlocked or another unlock is running
    /// - `Cancelled` if the prompt was dismissed
    /// - `TooManyAttempts` once the retry budget is spent; the session then
    ///   reports `locked_out` until the next call
    ///
    /// Any error leaves the session in `NoPassword` with nothing written.
    pub fn unlock(&self) -> Result<UnlockReport> {
        let _batch = self.batch_guard()?;
        {
            let mut session = self.session();
            match session.state() {
                SessionState::Unlocked => {
                    return Err(VeilError::InvalidState(
                        "vault is already unlocked".to_string(),
                    ))
                }
                SessionState::Unlocking => {
                    return Err(VeilError::InvalidState(
                        "an unlock is already in progress".to_string(),
                    ))
                }
                SessionState::NoPassword => session.begin_unlock(),
            }
        }

        let acquired = match self.acquire_password() {
            Ok(acquired) => acquired,
            Err(err) => {
                let locked_out = matches!(err, VeilError::TooManyAttempts(_));
                self.engine.clear_key_cache();
                self.session().abort_unlock(locked_out);
                if locked_out {
                    tracing::warn!("Unlock attempts exhausted; interception disabled");
                } else {
                    tracing::info!(error = %err, "Unlock aborted");
                }
                return Err(err);
            }
        };

        self.session().complete_unlock(&acquired.password);
        let keys = Keys {
            current: acquired.password,
            previous: None,
        };
        let mut batch = acquired.report;
        self.decrypt_all(acquired.encrypted, &keys, &mut batch);

        tracing::info!(
            first_time = acquired.first_time,
            decrypted = batch.processed_count(),
            failed = batch.failed.len(),
            "Vault unlocked"
        );
        Ok(UnlockReport {
            first_time: acquired.first_time,
            attempts: acquired.attempts,
            batch,
        })
    }

    fn acquire_password(&self) -> Result<Acquired> {
        let mut report = BatchReport::default();
        let encrypted = self.scan_encrypted(&mut report)?;

        let samples: Vec<&str> = encrypted
            .iter()
            .filter_map(|(path, content)| match EncryptedBlob::parse(content) {
                Ok(_) => Some(content.as_str()),
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Skipping malformed note for verification");
                    None
                }
            })
            .take(VERIFY_SAMPLES)
            .collect();

        let (password, attempts, first_time) = if samples.is_empty() {
            let (password, attempts) = self.choose_password()?;
            (password, attempts, true)
        } else {
            let (password, attempts) = self.verify_password(&samples)?;
            (password, attempts, false)
        };

        Ok(Acquired {
            password,
            attempts,
            first_time,
            encrypted,
            report,
        })
    }

    fn verify_password(&self, samples: &[&str]) -> Result<(Zeroizing<String>, u32)> {
        let max = self.options.max_attempts;
        let mut message = "Enter vault password".to_string();

        for attempt in 1..=max {
            let candidate = self
                .ask(PromptPurpose::Unlock, attempt, &message)?
                .ok_or(VeilError::Cancelled)?;

            if self.opens_any(samples, &candidate)? {
                return Ok((candidate, attempt));
            }
            tracing::warn!(attempt, max, "Password verification failed");
            message = format!("Incorrect password, try again ({attempt} of {max})");
        }

        Err(VeilError::TooManyAttempts(max))
    }

    /// Whether `candidate` opens at least one of `samples`.
    ///
    /// A single damaged note must not lock out the right password, so an
    /// authentication failure moves on to the next sample.
    fn opens_any(&self, samples: &[&str], candidate: &str) -> Result<bool> {
        for sample in samples {
            match self.engine.decrypt(sample, candidate) {
                Ok(_) => return Ok(true),
                Err(VeilError::Authentication) | Err(VeilError::MalformedBlob(_)) => continue,
                Err(VeilError::InvalidInput(_)) => return Ok(false),
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    fn choose_password(&self) -> Result<(Zeroizing<String>, u32)> {
        let max = self.options.max_attempts;
        let mut message = "Choose a vault password".to_string();

        for attempt in 1..=max {
            let chosen = self
                .ask(PromptPurpose::Choose, attempt, &message)?
                .ok_or(VeilError::Cancelled)?;
            if let Err(err) = validate_passphrase(&chosen) {
                tracing::warn!(attempt, max, "Chosen password rejected by policy");
                message = format!("{err}; choose another ({attempt} of {max})");
                continue;
            }

            let confirmed = self
                .ask(PromptPurpose::Confirm, attempt, "Confirm vault password")?
                .ok_or(VeilError::Cancelled)?;
            if confirmed.as_str() != chosen.as_str() {
                tracing::warn!(attempt, max, "Password confirmation did not match");
                message = format!("Passwords do not match, try again ({attempt} of {max})");
                continue;
            }

            return Ok((chosen, attempt));
        }

        Err(VeilError::TooManyAttempts(max))
    }

    /// Write the plaintext of each blob back in place and track it.
    ///
    /// A note whose stored content no longer matches its scanned blob is
    /// left alone and reported as skipped.
    fn decrypt_all(
        &self,
        encrypted: Vec<(String, String)>,
        keys: &Keys,
        report: &mut BatchReport,
    ) {
        for (path, blob) in encrypted {
            let plaintext = match self.decrypt_with_fallback(&blob, keys) {
                Ok(plaintext) => Zeroizing::new(plaintext),
                Err(VeilError::MalformedBlob(reason)) => {
                    tracing::warn!(path = %path, reason = %reason, "Skipping malformed note");
                    report.skip(path, reason);
                    continue;
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not decrypt note");
                    report.fail(path, err);
                    continue;
                }
            };

            match self.still_holds(&path, &blob) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(path = %path, "Note changed while unlocking; leaving it as stored");
                    report.skip(path, "changed on disk during unlock");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not re-read note");
                    report.fail(path, err);
                    continue;
                }
            }

            match self.storage.write(&path, &plaintext) {
                Ok(()) => {
                    tracing::debug!(path = %path, "Decrypted note in place");
                    self.tracker().mark_private(&path);
                    report.processed.push(path);
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not write decrypted note");
                    report.fail(path, err);
                }
            }
        }
    }

    /// Encrypt every private note, then forget the password.
    ///
    /// Candidates are the tracked notes plus every listed note carrying the
    /// marker; each is re-checked against its live content. Tracked notes
    /// whose marker is gone are untracked and reported as skipped. Notes that
    /// fail stay as they are on disk and are reported; the password is
    /// forgotten regardless. If the vault cannot be listed, the tracked notes
    /// are still encrypted and the listing error is reported against `.`.
    pub fn lock(&self) -> Result<BatchReport> {
        let keys = self.require_keys()?;
        let _batch = self.batch_guard()?;
        let mut report = BatchReport::default();

        if let Some(previous) = keys.previous.as_deref() {
            match self.reconcile_files(&keys.current, previous, &mut report) {
                Ok(0) => {}
                Ok(stranded) => tracing::warn!(
                    stranded,
                    "Notes remain under the previous password; recover them after the next unlock"
                ),
                Err(err) => tracing::warn!(error = %err, "Could not reconcile before locking"),
            }
        }

        let listed = match self.storage.list_text_files() {
            Ok(listed) => listed,
            Err(err) => {
                tracing::warn!(error = %err, "Could not list notes; locking tracked notes only");
                report.fail(".", err);
                Vec::new()
            }
        };
        let candidates: BTreeSet<String> = self
            .tracked_paths()
            .into_iter()
            .chain(
                listed
                    .into_iter()
                    .filter(|path| self.options.is_content_path(path)),
            )
            .collect();

        for path in candidates {
            let content = match self.storage.read(&path) {
                Ok(content) => content,
                Err(VeilError::NotFound(_)) => {
                    self.tracker().unmark_private(&path);
                    report.skip(path, "note no longer exists");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not read note for locking");
                    report.fail(path, err);
                    continue;
                }
            };
            if is_encrypted(&content) {
                continue;
            }
            if !self.options.has_marker(&content) {
                if self.tracker().unmark_private(&path) {
                    tracing::info!(path = %path, "Private marker removed; leaving note as plaintext");
                    report.skip(path, "private marker removed");
                }
                continue;
            }

            let written = self
                .engine
                .encrypt(&content, &keys.current)
                .and_then(|blob| self.storage.write(&path, &blob));
            match written {
                Ok(()) => {
                    tracing::debug!(path = %path, "Encrypted note");
                    report.processed.push(path);
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not encrypt note");
                    report.fail(path, err);
                }
            }
        }

        self.session().forget();
        self.engine.clear_key_cache();
        self.tracker().clear();

        tracing::info!(
            encrypted = report.processed_count(),
            failed = report.failed.len(),
            "Vault locked"
        );
        Ok(report)
    }

    /// Lock synchronously if unlocked; `None` when there was nothing to do.
    pub fn shutdown(&self) -> Result<Option<BatchReport>> {
        if !self.is_unlocked() {
            self.engine.clear_key_cache();
            return Ok(None);
        }
        self.lock().map(Some)
    }
}
