//! Password rotation and recovery of notes left under an older password.

use zeroize::Zeroizing;

use super::{BatchReport, Interceptor};
use crate::crypto::{is_encrypted, validate_passphrase};
use crate::error::{Result, VeilError};
use crate::storage::{PasswordPrompt, PromptPurpose, Storage};

impl<S: Storage, P: PasswordPrompt> Interceptor<S, P> {
    /// Re-encrypt every encrypted note under a newly chosen password.
    ///
    /// All notes are decrypted into memory before the new password is asked
    /// for; cancelling at the prompt keeps the current password. The old
    /// password stays available for reads until every collected note has
    /// been rewritten. A note saved while the new password was being asked
    /// for is not overwritten; it is reported as skipped. If any note is
    /// left under the old password, that password remains retained and
    /// [`status`](Self::status) reports `rotation_pending` until
    /// [`reconcile`](Self::reconcile) finishes the job.
    pub fn change_password(&self) -> Result<BatchReport> {
        let keys = self.require_keys()?;
        if keys.previous.is_some() {
            return Err(VeilError::InvalidState(
                "an earlier password change is unfinished; reconcile first".to_string(),
            ));
        }
        let _batch = self.batch_guard()?;
        let mut report = BatchReport::default();

        let mut plaintexts = Vec::new();
        for (path, blob) in self.scan_encrypted(&mut report)? {
            match self.engine.decrypt(&blob, &keys.current) {
                Ok(plaintext) => plaintexts.push((path, blob, Zeroizing::new(plaintext))),
                Err(VeilError::MalformedBlob(reason)) => {
                    tracing::warn!(path = %path, reason = %reason, "Skipping malformed note");
                    report.skip(path, reason);
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not decrypt note for rotation");
                    report.fail(path, err);
                }
            }
        }

        let new_password = match self.ask_new_password(&keys.current) {
            Ok(password) => password,
            Err(err) => {
                tracing::info!(error = %err, "Password change abandoned; keeping current password");
                return Err(err);
            }
        };

        self.engine.clear_key_cache();
        self.session().rotate(&keys.current, &new_password);

        let mut stranded = 0usize;
        for (path, blob, plaintext) in plaintexts {
            match self.storage.read(&path) {
                Ok(content) if content == blob => {}
                Ok(content) => {
                    tracing::warn!(path = %path, "Note changed during the password change; not rewriting it");
                    if is_encrypted(&content) {
                        stranded += 1;
                    }
                    report.skip(path, "changed on disk during rotation");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not re-read note");
                    stranded += 1;
                    report.fail(path, err);
                    continue;
                }
            }

            let written = self
                .engine
                .encrypt(&plaintext, &new_password)
                .and_then(|blob| self.storage.write(&path, &blob));
            match written {
                Ok(()) => {
                    tracing::debug!(path = %path, "Re-encrypted note");
                    report.processed.push(path);
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Note left under the previous password");
                    stranded += 1;
                    report.fail(path, err);
                }
            }
        }

        if stranded == 0 {
            self.session().finish_rotation();
        }
        tracing::info!(
            reencrypted = report.processed_count(),
            stranded,
            "Password changed"
        );
        Ok(report)
    }

    fn ask_new_password(&self, current: &str) -> Result<Zeroizing<String>> {
        let new_password = self
            .ask(PromptPurpose::NewPassword, 1, "Enter new vault password")?
            .ok_or(VeilError::Cancelled)?;
        validate_passphrase(&new_password)?;
        if new_password.as_str() == current {
            return Err(VeilError::InvalidInput(
                "New password must differ from the current one".to_string(),
            ));
        }

        let confirmed = self
            .ask(PromptPurpose::ConfirmNew, 1, "Confirm new vault password")?
            .ok_or(VeilError::Cancelled)?;
        if confirmed.as_str() != new_password.as_str() {
            return Err(VeilError::PasswordMismatch);
        }
        Ok(new_password)
    }

    /// Move notes still under an older password onto the current one.
    ///
    /// Uses `older` if given, otherwise the password retained by an
    /// unfinished [`change_password`](Self::change_password). In the latter
    /// case the retained password is dropped once nothing remains under it.
    pub fn reconcile(&self, older: Option<&str>) -> Result<BatchReport> {
        let keys = self.require_keys()?;
        let fallback = match (older, keys.previous.as_deref()) {
            (Some(older), _) if older.is_empty() => {
                return Err(VeilError::InvalidInput(
                    "Password cannot be empty".to_string(),
                ))
            }
            (Some(older), _) => older,
            (None, Some(previous)) => previous.as_str(),
            (None, None) => {
                return Err(VeilError::InvalidInput(
                    "no older password given and none retained".to_string(),
                ))
            }
        };

        let _batch = self.batch_guard()?;
        let mut report = BatchReport::default();
        let stranded = self.reconcile_files(&keys.current, fallback, &mut report)?;

        if older.is_none() && stranded == 0 {
            self.session().finish_rotation();
        }
        tracing::info!(
            recovered = report.processed_count(),
            stranded,
            "Reconciled notes"
        );
        Ok(report)
    }

    /// Ask for an older password and reconcile with it.
    pub fn recover(&self) -> Result<BatchReport> {
        self.require_keys()?;
        let older = self
            .ask(
                PromptPurpose::Recover,
                1,
                "Enter the previous vault password",
            )?
            .ok_or(VeilError::Cancelled)?;
        self.reconcile(Some(older.as_str()))
    }

    /// Re-encrypt under `current` each note that only `fallback` opens.
    ///
    /// Returns how many such notes could not be rewritten.
    pub(super) fn reconcile_files(
        &self,
        current: &str,
        fallback: &str,
        report: &mut BatchReport,
    ) -> Result<usize> {
        let mut stranded = 0;
        for (path, blob) in self.scan_encrypted(report)? {
            match self.engine.decrypt(&blob, current) {
                Ok(_) => continue,
                Err(VeilError::Authentication) => {}
                Err(VeilError::MalformedBlob(reason)) => {
                    report.skip(path, reason);
                    continue;
                }
                Err(err) => {
                    report.fail(path, err);
                    continue;
                }
            }

            let plaintext = match self.engine.decrypt(&blob, fallback) {
                Ok(plaintext) => Zeroizing::new(plaintext),
                Err(VeilError::Authentication) => {
                    tracing::warn!(path = %path, "Note opens under neither password");
                    report.fail(path, "does not decrypt under either password");
                    continue;
                }
                Err(err) => {
                    report.fail(path, err);
                    continue;
                }
            };

            let written = self
                .engine
                .encrypt(&plaintext, current)
                .and_then(|blob| self.storage.write(&path, &blob));
            match written {
                Ok(()) => {
                    tracing::debug!(path = %path, "Moved note to current password");
                    self.tracker().mark_private(&path);
                    report.processed.push(path);
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "Could not rewrite note");
                    stranded += 1;
                    report.fail(path, err);
                }
            }
        }
        Ok(stranded)
    }
}
