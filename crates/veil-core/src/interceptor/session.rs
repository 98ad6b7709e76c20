//! In-memory password session.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use zeroize::Zeroizing;

/// Where the password lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No password held; interception is a pass-through.
    NoPassword,
    /// A password is being entered or verified.
    Unlocking,
    /// Password verified; reads decrypt and marked writes encrypt.
    Unlocked,
}

/// Snapshot of the passwords needed for one operation.
///
/// Copied out of the session so no lock is held while calling into host
/// storage; both strings are wiped when the snapshot is dropped.
pub(crate) struct Keys {
    pub current: Zeroizing<String>,
    /// Password notes may still be under after an unfinished rotation.
    pub previous: Option<Zeroizing<String>>,
}

fn reveal(secret: &SecretString) -> Zeroizing<String> {
    Zeroizing::new(secret.expose_secret().to_string())
}

/// Password state for one vault. Never persisted.
pub(crate) struct Session {
    state: SessionState,
    password: Option<SecretString>,
    previous: Option<SecretString>,
    locked_out: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::NoPassword,
            password: None,
            previous: None,
            locked_out: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn locked_out(&self) -> bool {
        self.locked_out
    }

    pub fn rotation_pending(&self) -> bool {
        self.previous.is_some()
    }

    pub fn keys(&self) -> Option<Keys> {
        if self.state != SessionState::Unlocked {
            return None;
        }
        let current = self.password.as_ref()?;
        Some(Keys {
            current: reveal(current),
            previous: self.previous.as_ref().map(reveal),
        })
    }

    pub fn begin_unlock(&mut self) {
        self.state = SessionState::Unlocking;
        self.locked_out = false;
    }

    pub fn abort_unlock(&mut self, locked_out: bool) {
        self.forget();
        self.locked_out = locked_out;
    }

    pub fn complete_unlock(&mut self, password: &str) {
        self.password = Some(SecretString::from(password.to_string()));
        self.previous = None;
        self.state = SessionState::Unlocked;
    }

    /// Switch to `new` while keeping `old` until the rotation finishes.
    pub fn rotate(&mut self, old: &str, new: &str) {
        self.previous = Some(SecretString::from(old.to_string()));
        self.password = Some(SecretString::from(new.to_string()));
    }

    pub fn finish_rotation(&mut self) {
        self.previous = None;
    }

    pub fn forget(&mut self) {
        self.password = None;
        self.previous = None;
        self.state = SessionState::NoPassword;
    }
}
