//! JSON file storage.
//!
//! Every `write` serializes the full image to a temporary file next to the
//! database and renames it over the database, so the file on disk always
//! holds either the previous image or the new one. An empty file reads as
//! "no database yet".

use super::DocumentStorage;
use crate::StoreError;
use crate::primitives::MAX_DATABASE_FILE_SIZE;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A database image stored as one JSON document on disk.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    dir: PathBuf,
}

impl JsonStorage {
    /// Open or create the file at `path`.
    ///
    /// The parent directory must already exist. Any file-system failure
    /// (missing directory, path is a directory, permissions) is an I/O error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Io(format!("Cannot open '{}': {}", path.display(), e)))?;

        let metadata = file
            .metadata()
            .map_err(|e| StoreError::Io(format!("Cannot read file metadata: {}", e)))?;
        if metadata.len() > MAX_DATABASE_FILE_SIZE {
            return Err(StoreError::Io(format!(
                "Database file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_DATABASE_FILE_SIZE
            )));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self { path, dir })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStorage for JsonStorage {
    fn read(&mut self) -> Result<Option<Value>, StoreError> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Io(format!("Cannot read '{}': {}", self.path.display(), e)))?;

        if raw.trim().is_empty() {
            return Ok(None);
        }

        let image: Value = serde_json::from_str(&raw).map_err(|e| {
            StoreError::Deserialization(format!(
                "'{}' is not a JSON database: {}",
                self.path.display(),
                e
            ))
        })?;
        if !image.is_object() {
            return Err(StoreError::Deserialization(format!(
                "'{}' does not contain a JSON object",
                self.path.display()
            )));
        }
        Ok(Some(image))
    }

    fn write(&mut self, image: &Value) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(image).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut staged = NamedTempFile::new_in(&self.dir)
            .map_err(|e| StoreError::Io(format!("Cannot stage write: {}", e)))?;
        staged
            .write_all(&bytes)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| StoreError::Io(e.to_string()))?;
        staged.persist(&self.path).map_err(|e| {
            StoreError::Io(format!("Cannot replace '{}': {}", self.path.display(), e.error))
        })?;
        Ok(())
    }
}
