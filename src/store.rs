//! File-backed settings store
//!
//! A single pretty-printed JSON object on disk. Writes are merge-writes: the
//! persisted object is re-read, the caller's keys are overlaid and the result
//! replaces the file atomically (temp file in the same directory + rename), so
//! a concurrent reader never sees a truncated document.
//!
//! Two sessions saving at nearly the same time can still lose one of the
//! updates (last writer wins). There is no cross-process lock.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::settings::{display_defaults, Document};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the fixed location under an application root
    pub fn in_dir(root: &Path) -> Self {
        Self::new(root.join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted document. A missing file reads as an empty mapping.
    pub fn load(&self) -> Result<Document, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Settings file {:?} not found, using empty document", self.path);
                return Ok(Document::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        match value {
            serde_json::Value::Object(doc) => {
                tracing::debug!("Loaded {} settings keys from {:?}", doc.len(), self.path);
                Ok(doc)
            }
            _ => Err(StoreError::NotAMapping {
                path: self.path.clone(),
            }),
        }
    }

    /// Merge `patch` into the persisted document and write it back.
    ///
    /// Keys not named in the patch keep their persisted values. Display
    /// preference keys absent from both are written with their defaults.
    /// Returns the document as written.
    pub fn save(&self, patch: &Document) -> Result<Document, StoreError> {
        let mut doc = self.load()?;
        for (key, value) in patch {
            doc.insert(key.clone(), value.clone());
        }
        for (key, value) in display_defaults() {
            doc.entry(key).or_insert(value);
        }

        let json = serde_json::to_string_pretty(&doc)?;
        self.write_atomic(json.as_bytes())?;
        tracing::debug!(
            keys = ?patch.keys().collect::<Vec<_>>(),
            "Saved settings to {:?}",
            self.path
        );
        Ok(doc)
    }

    fn write_atomic(&self, payload: &[u8]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(payload).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
