//! Persisted user settings.
//!
//! DESIGN
//! ======
//! The dashboard persists exactly one value: the voice service API key.
//! `SettingsProvider` keeps the store and the voice assistant ignorant of
//! where it lives. `JsonFileSettings` reads its file once on open and
//! rewrites it on every `set`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::notify::ErrorCode;

/// Fixed storage key for the voice service credential.
pub const API_KEY_SETTING: &str = "voice.apiKey";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_SETTINGS_IO",
            Self::Json(_) => "E_SETTINGS_JSON",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

pub trait SettingsProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
}

// =============================================================================
// IN-MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_api_key(key: &str) -> Self {
        let settings = Self::new();
        settings
            .values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(API_KEY_SETTING.into(), key.into());
        settings
    }
}

impl SettingsProvider for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.into(), value.into());
        Ok(())
    }
}

// =============================================================================
// JSON FILE
// =============================================================================

#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileSettings {
    /// Load settings from `path`. A missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file absent; starting empty");
                BTreeMap::new()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        info!(path = %path.display(), keys = values.len(), "settings loaded");
        Ok(Self { path, values: Mutex::new(values) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsProvider for JsonFileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = values.insert(key.into(), value.into());

        let written = serde_json::to_string_pretty(&*values)
            .map_err(SettingsError::from)
            .and_then(|body| {
                std::fs::write(&self.path, body).map_err(|source| SettingsError::Io { path: self.path.clone(), source })
            });

        // EDGE: keep memory and disk in agreement when the write fails.
        if written.is_err() {
            match previous {
                Some(old) => values.insert(key.into(), old),
                None => values.remove(key),
            };
        }
        written
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
