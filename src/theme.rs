//! Theme preference store.
//!
//! Reads the preference from storage once at construction; `set` and
//! `toggle` write it back. `System` defers to whatever the host reports, so
//! resolution takes the host's dark-mode flag as an argument.
//!
//! TRADE-OFFS
//! ==========
//! An unreadable or unknown stored value falls back to `System` with a
//! warning rather than failing startup over a cosmetic setting.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ApiError;
use crate::storage::{KeyValueStorage, THEME_KEY};

/// Concrete palette applied to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// What the user asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    #[must_use]
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::System if system_prefers_dark => Theme::Dark,
            Self::System => Theme::Light,
        }
    }
}

impl std::str::FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(format!("unknown theme: {other} (expected light, dark or system)")),
        }
    }
}

impl std::fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeStore {
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<ThemePreference>,
}

impl ThemeStore {
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let preference = read_preference(storage.as_ref());
        let (state, _) = watch::channel(preference);
        Self { storage, state }
    }

    #[must_use]
    pub fn preference(&self) -> ThemePreference {
        *self.state.borrow()
    }

    #[must_use]
    pub fn resolve(&self, system_prefers_dark: bool) -> Theme {
        self.preference().resolve(system_prefers_dark)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemePreference> {
        self.state.subscribe()
    }

    /// Persist and publish a new preference.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the preference cannot be written; the
    /// in-memory preference is left unchanged in that case.
    pub fn set(&self, preference: ThemePreference) -> Result<(), ApiError> {
        self.storage.set_item(THEME_KEY, preference.as_str())?;
        self.state.send_if_modified(|current| {
            let changed = *current != preference;
            *current = preference;
            changed
        });
        Ok(())
    }

    /// Switch to the explicit opposite of what is currently displayed.
    ///
    /// # Errors
    ///
    /// Same as [`ThemeStore::set`].
    pub fn toggle(&self, system_prefers_dark: bool) -> Result<ThemePreference, ApiError> {
        let next = match self.resolve(system_prefers_dark) {
            Theme::Light => ThemePreference::Dark,
            Theme::Dark => ThemePreference::Light,
        };
        self.set(next)?;
        Ok(next)
    }
}

fn read_preference(storage: &dyn KeyValueStorage) -> ThemePreference {
    match storage.get_item(THEME_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "ignoring stored theme");
            ThemePreference::System
        }),
        Ok(None) => ThemePreference::System,
        Err(e) => {
            tracing::warn!(error = %e, "could not read stored theme");
            ThemePreference::System
        }
    }
}
