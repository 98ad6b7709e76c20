//! Application context for the Veil CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config file.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use veil_core::{CipherEngine, FsStorage, Interceptor, VeilError, VeilOptions};

use crate::cli::Cli;
use crate::config::{read_config, VeilConfig};
use crate::errors::CliError;
use crate::ui::UiContext;

use super::prompt::TerminalPrompt;
use super::resolver::{missing_config_message, missing_vault_message, resolve_config_path};
use super::vault::Vault;

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<VeilConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn ui(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.no_color)
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&VeilConfig>> {
        let config = self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if !path.exists() {
                tracing::debug!(path = %path.display(), "No config file");
                return Ok::<_, anyhow::Error>(None);
            }
            read_config(&path).map(Some)
        })?;
        Ok(config.as_ref())
    }

    /// Privacy options from the config, or defaults.
    pub fn options(&self) -> anyhow::Result<VeilOptions> {
        Ok(self
            .config()?
            .map(|config| config.privacy.clone())
            .unwrap_or_default())
    }

    /// Vault directory from `--vault` / VEIL_VAULT, then the config.
    pub fn vault_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.vault.as_deref() {
            return Ok(PathBuf::from(path));
        }
        match self.config()? {
            Some(config) => Ok(PathBuf::from(&config.vault.path)),
            None => {
                let config_path = resolve_config_path()?;
                let message = missing_config_message(&config_path);
                let (message, hint) = message
                    .split_once('\n')
                    .unwrap_or((message.as_str(), ""));
                Err(CliError::not_found(message, hint).into())
            }
        }
    }

    pub fn open_storage(&self) -> anyhow::Result<FsStorage> {
        let path = self.vault_path()?;
        let options = self.options()?;
        FsStorage::open(&path, &options.extensions).map_err(|err| match err {
            VeilError::NotFound(_) => CliError::not_found(
                missing_vault_message(&path),
                "Hint: Run `veil init <PATH>` to create it.",
            )
            .into(),
            other => anyhow::Error::new(other),
        })
    }

    /// Open the vault behind the interception layer.
    pub fn open_vault(&self) -> anyhow::Result<Vault> {
        let storage = self.open_storage()?;
        let vault = Interceptor::with_engine(
            storage,
            TerminalPrompt::new(),
            self.options()?,
            CipherEngine::new(),
        )?;
        Ok(vault)
    }
}
