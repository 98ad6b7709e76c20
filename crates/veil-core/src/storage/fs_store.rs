//! Directory-backed storage.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::traits::Storage;
use crate::error::{Result, VeilError};
use crate::fs::write_atomic;

/// Notes stored as files under a vault root directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FsStorage {
    /// Open a vault rooted at `root`, enumerating files with `extensions`.
    ///
    /// # Errors
    ///
    /// Returns `VeilError::NotFound` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>, extensions: &[String]) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VeilError::NotFound(format!(
                "vault directory {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(VeilError::InvalidInput(format!(
                "path must be relative to the vault: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }

    fn wants(&self, entry: &DirEntry) -> bool {
        entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

impl Storage for FsStorage {
    fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => VeilError::NotFound(path.to_string()),
            _ => err.into(),
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        write_atomic(&full, content.as_bytes())?;
        Ok(())
    }

    fn list_text_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(VeilError::Storage(format!(
                        "failed to walk {}: {}",
                        self.root.display(),
                        e
                    )))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.wants(&entry) {
                continue;
            }
            match self.relative_name(entry.path()) {
                Some(name) => files.push(name),
                None => tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 path"),
            }
        }
        files.sort();
        Ok(files)
    }
}
