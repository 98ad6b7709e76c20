//! In-memory storage for hosts that persist notes themselves.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::Storage;
use crate::error::{Result, VeilError};

/// Notes held in a sorted map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(path, content)` pairs.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let map = files
            .into_iter()
            .map(|(path, content)| (path.into(), content.into()))
            .collect();
        Self {
            files: Mutex::new(map),
        }
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw content of `path`, bypassing any wrapping layer.
    pub fn get(&self, path: &str) -> Option<String> {
        self.files().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &str) -> Result<String> {
        self.get(path)
            .ok_or_else(|| VeilError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        self.files().insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn list_text_files(&self) -> Result<Vec<String>> {
        Ok(self.files().keys().cloned().collect())
    }
}
