use super::DocumentStorage;
use crate::StoreError;
use serde_json::Value;

/// In-memory storage. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    image: Option<Value>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last image written, if any.
    #[must_use]
    pub fn image(&self) -> Option<&Value> {
        self.image.as_ref()
    }
}

impl DocumentStorage for MemoryStorage {
    fn read(&mut self) -> Result<Option<Value>, StoreError> {
        Ok(self.image.clone())
    }

    fn write(&mut self, image: &Value) -> Result<(), StoreError> {
        self.image = Some(image.clone());
        Ok(())
    }
}
