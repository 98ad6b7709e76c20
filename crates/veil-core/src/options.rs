//! Interception options: which notes are private and how unlock behaves.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeilError};

/// Marker that flags a note as private unless configured otherwise.
pub const DEFAULT_MARKER: &str = "#private";

/// Password attempts allowed during unlock unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Settings shared by the interception layer and its hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeilOptions {
    /// Literal substring that marks a note as private.
    pub marker: String,
    /// File extensions (without the dot) of content-bearing notes.
    pub extensions: Vec<String>,
    /// Password attempts allowed while unlocking.
    pub max_attempts: u32,
}

impl Default for VeilOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            extensions: vec!["md".to_string()],
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl VeilOptions {
    /// Check the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.marker.trim().is_empty() {
            return Err(VeilError::Config("marker cannot be blank".to_string()));
        }
        if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(VeilError::Config(
                "at least one note extension is required".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(VeilError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` names a note the layer may encrypt.
    pub fn is_content_path(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

    /// Whether `content` carries the private marker.
    pub fn has_marker(&self, content: &str) -> bool {
        content.contains(&self.marker)
    }
}
