//! Path resolution for the config file and vault directory.

use std::path::{Path, PathBuf};

use crate::config::default_config_path;
use crate::constants::env_vars;

/// Resolve the config file path, checking VEIL_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(env_vars::CONFIG) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Error message when no vault is configured.
pub fn missing_config_message(config_path: &Path) -> String {
    format!(
        "No vault configured (looked for {})\nHint: Run `veil init <PATH>` or set VEIL_VAULT=/path/to/notes",
        config_path.display()
    )
}

/// Error message when the configured vault directory is missing.
pub fn missing_vault_message(vault: &Path) -> String {
    format!("No vault directory at {}", vault.display())
}
