//! Persisted client state: a tiny string key/value store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser build kept the bearer token and theme in `localStorage`. This
//! trait keeps that surface so the gateway and theme store are agnostic to
//! where values live: in memory for tests and embedding, on disk for the CLI.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ApiError;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "nexo_token";
/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "nexo_theme";

/// String key/value persistence with `localStorage` semantics.
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the backing store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the backing store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), ApiError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// One plain-text file per key inside a state directory.
///
/// The directory is created lazily on first write. Values are trimmed on
/// read, so a file edited by hand with a trailing newline still loads.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ApiError> {
        if !is_valid_key(key) {
            return Err(ApiError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ApiError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value.trim().to_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ApiError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keys become file names, so only a conservative charset is allowed.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
