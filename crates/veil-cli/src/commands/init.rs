use std::path::PathBuf;

use veil_core::VeilOptions;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{write_config, VeilConfig};
use crate::errors::CliError;
use crate::ui::{hint, receipt, Badge};

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let target = args
        .path
        .clone()
        .or_else(|| ctx.cli().vault.clone())
        .ok_or_else(|| {
            CliError::invalid_input("No vault path provided. Pass a path or use --vault.")
        })?;

    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let mut privacy = VeilOptions::default();
    if let Some(marker) = &args.marker {
        privacy.marker = marker.clone();
    }
    if !args.extensions.is_empty() {
        privacy.extensions = args.extensions.clone();
    }
    privacy.validate().map_err(CliError::from)?;

    let target = PathBuf::from(target);
    std::fs::create_dir_all(&target).map_err(|e| {
        anyhow::anyhow!("Failed to create vault directory {}: {}", target.display(), e)
    })?;
    let target = target.canonicalize()?;

    let marker = privacy.marker.clone();
    write_config(&config_path, &VeilConfig::new(target.clone(), privacy))?;
    tracing::info!(vault = %target.display(), "Wrote config");

    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!(
            "{}",
            receipt(
                &ui,
                Badge::Ok,
                "Vault configured",
                &[
                    ("Vault", target.display().to_string()),
                    ("Config", config_path.display().to_string()),
                    ("Marker", marker.clone()),
                ],
            )
        );
        println!(
            "{}",
            hint(
                &ui,
                &format!("Add {} to a note, then run `veil lock`.", marker)
            )
        );
    }
    Ok(())
}
