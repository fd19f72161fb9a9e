//! Persistence port.
//!
//! The core reads preferences once before migrating and writes them once
//! after a successful submission. [`FileStore`] keeps them in a JSON or TOML
//! file, chosen by extension, inside a small versioned envelope:
//!
//! ```json
//! { "schemaVersion": 2, "values": { "backgroundColor": 16711680 } }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

use crate::{
    data::{PersistedPreferences, SchemaVersion},
    error::StoreError,
};

/// Where preferences live between settings-page visits.
pub trait PreferenceStore {
    /// Read the last saved preferences. Nothing saved yet is not an error.
    fn load(&self) -> Result<PersistedPreferences, StoreError>;

    /// Replace the saved preferences.
    fn save(&mut self, preferences: &PersistedPreferences) -> Result<(), StoreError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &mut S {
    fn load(&self) -> Result<PersistedPreferences, StoreError> {
        (**self).load()
    }

    fn save(&mut self, preferences: &PersistedPreferences) -> Result<(), StoreError> {
        (**self).save(preferences)
    }
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Option<PersistedPreferences>,
    saves: usize,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding previously saved preferences.
    pub fn with_preferences(preferences: PersistedPreferences) -> Self {
        Self {
            values: Some(preferences),
            saves: 0,
        }
    }

    /// Current content, `None` until something is saved.
    pub fn preferences(&self) -> Option<&PersistedPreferences> {
        self.values.as_ref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<PersistedPreferences, StoreError> {
        Ok(self.values.clone().unwrap_or_default())
    }

    fn save(&mut self, preferences: &PersistedPreferences) -> Result<(), StoreError> {
        self.values = Some(preferences.clone());
        self.saves += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    schema_version: SchemaVersion,
    values: PersistedPreferences,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Envelope(Envelope),
    Flat(PersistedPreferences),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

/// File-backed store.
///
/// A flat key/value object without envelope is accepted on load. Every save
/// first copies the existing file to `<name>.bk-<unix secs>.<ext>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    version: SchemaVersion,
    format: Format,
}

impl FileStore {
    /// Store at `path`, stamping saves with `version`.
    pub fn new(path: impl AsRef<Path>, version: SchemaVersion) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let format = match ext {
            "json" => Format::Json,
            "toml" | "tml" => Format::Toml,
            _ => {
                return Err(StoreError::UnsupportedFormat {
                    ext: ext.to_string(),
                });
            }
        };
        Ok(Self {
            path,
            version,
            format,
        })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema version read from the file, if it has an envelope.
    pub fn stored_version(&self) -> Result<Option<SchemaVersion>, StoreError> {
        Ok(match self.read()? {
            Some(Stored::Envelope(envelope)) => Some(envelope.schema_version),
            _ => None,
        })
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn format_error(&self, message: impl ToString) -> StoreError {
        StoreError::Format {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }

    fn read(&self) -> Result<Option<Stored>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let stored = match self.format {
            Format::Json => serde_json::from_str(&content).map_err(|e| self.format_error(e))?,
            Format::Toml => toml::from_str(&content).map_err(|e| self.format_error(e))?,
        };
        Ok(Some(stored))
    }

    fn backup(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        let ext = match self.format {
            Format::Json => "json",
            Format::Toml => "toml",
        };
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let backup_path = self.path.with_extension(format!("bk-{secs}.{ext}"));
        fs::copy(&self.path, &backup_path).map_err(|e| self.io_error(e))?;
        debug!("backed up preferences to {}", backup_path.display());
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<PersistedPreferences, StoreError> {
        let values = match self.read()? {
            None => PersistedPreferences::new(),
            Some(Stored::Envelope(envelope)) => {
                if envelope.schema_version != self.version {
                    info!(
                        "preferences saved by schema {}, current is {}",
                        envelope.schema_version, self.version
                    );
                }
                envelope.values
            }
            Some(Stored::Flat(values)) => values,
        };
        Ok(values)
    }

    fn save(&mut self, preferences: &PersistedPreferences) -> Result<(), StoreError> {
        let envelope = Envelope {
            schema_version: self.version,
            values: preferences.clone(),
        };
        let content = match self.format {
            Format::Json => {
                serde_json::to_string_pretty(&envelope).map_err(|e| self.format_error(e))?
            }
            Format::Toml => toml::to_string_pretty(&envelope).map_err(|e| self.format_error(e))?,
        };

        self.backup()?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, content).map_err(|e| self.io_error(e))?;
        info!("saved {} preferences to {}", preferences.len(), self.path.display());
        Ok(())
    }
}
