use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use veil_core::VeilOptions;

#[derive(Debug, Serialize, Deserialize)]
pub struct VeilConfig {
    pub vault: VaultSection,
    #[serde(default)]
    pub privacy: VeilOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VaultSection {
    pub path: String,
}

impl VeilConfig {
    pub fn new(vault_path: PathBuf, privacy: VeilOptions) -> Self {
        Self {
            vault: VaultSection {
                path: vault_path.to_string_lossy().to_string(),
            },
            privacy,
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<VeilConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: VeilConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    config
        .privacy
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn write_config(path: &Path, config: &VeilConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("veil"));
        }
    }
    Ok(home_dir()?.join(".config").join("veil"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let privacy = VeilOptions {
            marker: "#secret".to_string(),
            ..VeilOptions::default()
        };

        write_config(&path, &VeilConfig::new(PathBuf::from("/notes"), privacy)).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.vault.path, "/notes");
        assert_eq!(loaded.privacy.marker, "#secret");
        assert_eq!(loaded.privacy.max_attempts, 3);
    }

    #[test]
    fn test_privacy_section_is_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vault]\npath = \"/notes\"\n").unwrap();

        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.privacy, VeilOptions::default());
    }

    #[test]
    fn test_invalid_privacy_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[vault]\npath = \"/notes\"\n\n[privacy]\nmax_attempts = 0\n",
        )
        .unwrap();

        assert!(read_config(&path).is_err());
    }
}
