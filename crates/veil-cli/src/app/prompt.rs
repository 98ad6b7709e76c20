//! Password entry from the environment or the terminal.

use std::io::IsTerminal;

use dialoguer::Password;
use secrecy::SecretString;
use zeroize::Zeroizing;

use veil_core::{PasswordPrompt, PasswordRequest, PromptPurpose, VeilError};

use crate::constants::env_vars;

/// Environment variable that answers prompts for `purpose`.
fn env_var_for(purpose: PromptPurpose) -> &'static str {
    match purpose {
        PromptPurpose::Unlock | PromptPurpose::Choose | PromptPurpose::Confirm => {
            env_vars::PASSWORD
        }
        PromptPurpose::NewPassword | PromptPurpose::ConfirmNew => env_vars::NEW_PASSWORD,
        PromptPurpose::Recover => env_vars::OLD_PASSWORD,
    }
}

fn env_password(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Zeroizing::new)
}

/// Answers password requests from `VEIL_*` variables, falling back to a
/// hidden terminal prompt.
///
/// An environment password is offered once per request kind; if the layer
/// asks again it was rejected, and asking the same value again cannot help.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal(),
        }
    }
}

impl PasswordPrompt for TerminalPrompt {
    fn prompt_password(&self, request: &PasswordRequest) -> veil_core::Result<Option<SecretString>> {
        let var = env_var_for(request.purpose);

        if let Some(value) = env_password(var) {
            if request.attempt > 1 {
                tracing::debug!(var, "Environment password was rejected");
                return Err(match request.purpose {
                    PromptPurpose::Unlock => VeilError::Authentication,
                    _ => VeilError::InvalidInput(format!("{} rejected: {}", var, request.message)),
                });
            }
            return Ok(Some(SecretString::from(value.as_str())));
        }

        if !self.interactive {
            return Err(VeilError::InvalidInput(format!(
                "No password provided and no TTY available. Set {}.",
                var
            )));
        }

        let entered = Password::new()
            .with_prompt(request.message.as_str())
            .allow_empty_password(true)
            .interact()
            .map_err(|e| VeilError::InvalidInput(format!("Failed to read password: {}", e)))?;
        let entered = Zeroizing::new(entered);
        if entered.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(entered.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_routing() {
        assert_eq!(env_var_for(PromptPurpose::Unlock), "VEIL_PASSWORD");
        assert_eq!(env_var_for(PromptPurpose::Confirm), "VEIL_PASSWORD");
        assert_eq!(env_var_for(PromptPurpose::ConfirmNew), "VEIL_NEW_PASSWORD");
        assert_eq!(env_var_for(PromptPurpose::Recover), "VEIL_OLD_PASSWORD");
    }
}
