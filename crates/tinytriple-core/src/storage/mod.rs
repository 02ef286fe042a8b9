//! # Document Storage Backends
//!
//! A storage moves the whole database image (one JSON object) to and from
//! its medium. The `Database` layer above decides what goes into the image.
//!
//! Two backends:
//! - `JsonStorage`: a JSON file on disk, rewritten after every mutation
//! - `MemoryStorage`: an in-process image that disappears with the handle

mod json_storage;
mod memory_storage;

pub use json_storage::JsonStorage;
pub use memory_storage::MemoryStorage;

use crate::StoreError;
use serde_json::Value;

/// Read/write access to a database image.
pub trait DocumentStorage {
    /// Read the current image. `None` means the medium holds no database yet.
    fn read(&mut self) -> Result<Option<Value>, StoreError>;

    /// Replace the stored image.
    fn write(&mut self, image: &Value) -> Result<(), StoreError>;
}

/// Storage backend owned by a `Database`.
#[derive(Debug)]
pub enum StorageBackend {
    /// Volatile in-memory image.
    Memory(MemoryStorage),
    /// JSON file on disk.
    Json(JsonStorage),
}

impl StorageBackend {
    /// Check if the backend survives the process.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Memory(MemoryStorage::new())
    }
}

impl DocumentStorage for StorageBackend {
    fn read(&mut self) -> Result<Option<Value>, StoreError> {
        match self {
            Self::Memory(storage) => storage.read(),
            Self::Json(storage) => storage.read(),
        }
    }

    fn write(&mut self, image: &Value) -> Result<(), StoreError> {
        match self {
            Self::Memory(storage) => storage.write(image),
            Self::Json(storage) => storage.write(image),
        }
    }
}
