//! # Document Database
//!
//! Named tables of JSON documents over a single `StorageBackend`.
//!
//! Image layout, as written to storage:
//!
//! ```text
//! { "<table>": { "<doc id>": { ...document... }, ... }, ... }
//! ```
//!
//! Document ids start at 1 per table and are never reused. Every mutation
//! writes the full image through the backend; in-memory state is only
//! updated once that write succeeds.

use crate::StoreError;
use crate::storage::{DocumentStorage, StorageBackend};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Identifier of a document within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(pub u64);

// =============================================================================
// TABLE
// =============================================================================

/// A named collection of documents, iterated in id order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    documents: BTreeMap<DocId, Document>,
    last_id: u64,
}

impl Table {
    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Lookup a document by id.
    #[must_use]
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// All documents in id order.
    pub fn all(&self) -> impl Iterator<Item = (DocId, &Document)> {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    /// Documents satisfying `predicate`, in id order. Lazy.
    pub fn search<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = (DocId, &'a Document)>
    where
        F: Fn(&Document) -> bool + 'a,
    {
        self.all().filter(move |(_, doc)| predicate(doc))
    }

    /// True if any document satisfies `predicate`.
    pub fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Document) -> bool,
    {
        self.documents.values().any(predicate)
    }

    fn push(&mut self, document: Document) -> DocId {
        self.last_id = self.last_id.saturating_add(1);
        let id = DocId(self.last_id);
        self.documents.insert(id, document);
        id
    }

    fn from_value(name: &str, value: &Value) -> Result<Self, StoreError> {
        let entries = value.as_object().ok_or_else(|| {
            StoreError::Deserialization(format!("Table '{}' is not a JSON object", name))
        })?;

        let mut table = Self::default();
        for (key, doc) in entries {
            let id: u64 = key.parse().map_err(|_| {
                StoreError::Deserialization(format!(
                    "Table '{}' has non-numeric document id '{}'",
                    name, key
                ))
            })?;
            let doc = doc.as_object().cloned().ok_or_else(|| {
                StoreError::Deserialization(format!(
                    "Document {} in table '{}' is not a JSON object",
                    id, name
                ))
            })?;
            table.documents.insert(DocId(id), doc);
            table.last_id = table.last_id.max(id);
        }
        Ok(table)
    }

    fn to_value(&self) -> Value {
        let entries: Map<String, Value> = self
            .documents
            .iter()
            .map(|(id, doc)| (id.0.to_string(), Value::Object(doc.clone())))
            .collect();
        Value::Object(entries)
    }
}

// =============================================================================
// DATABASE
// =============================================================================

/// A set of named tables persisted through one storage backend.
#[derive(Debug)]
pub struct Database {
    storage: StorageBackend,
    tables: BTreeMap<String, Table>,
    created: bool,
}

impl Database {
    /// Load the database held by `storage`, or start an empty one.
    pub fn open(mut storage: StorageBackend) -> Result<Self, StoreError> {
        let image = storage.read()?;
        let created = image.is_none();

        let mut tables = BTreeMap::new();
        if let Some(Value::Object(entries)) = image {
            for (name, value) in &entries {
                tables.insert(name.clone(), Table::from_value(name, value)?);
            }
        }

        Ok(Self {
            storage,
            tables,
            created,
        })
    }

    /// True if the storage held no database when opened.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.created
    }

    /// Check if the backing storage survives the process.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.storage.is_persistent()
    }

    /// Create the named tables that do not exist yet.
    pub fn ensure_tables(&mut self, names: &[&str]) -> Result<(), StoreError> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.tables.contains_key(*name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        for name in &missing {
            self.tables.insert((*name).to_string(), Table::default());
        }
        if let Err(e) = self.flush() {
            for name in &missing {
                self.tables.remove(*name);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Lookup a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Names of all tables, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Insert one document.
    pub fn insert(&mut self, table: &str, document: Document) -> Result<DocId, StoreError> {
        let ids = self.insert_many(vec![(table, document)])?;
        ids.into_iter()
            .next()
            .ok_or_else(|| StoreError::Io("Insert produced no document id".to_string()))
    }

    /// Insert documents into (possibly different) tables with one write.
    ///
    /// Either every document is stored or, if the write fails, none is.
    /// Missing tables are created.
    pub fn insert_many(
        &mut self,
        batch: Vec<(&str, Document)>,
    ) -> Result<Vec<DocId>, StoreError> {
        let snapshot: Vec<(String, Option<u64>)> = batch
            .iter()
            .map(|(name, _)| ((*name).to_string(), self.tables.get(*name).map(|t| t.last_id)))
            .collect();

        let mut ids = Vec::with_capacity(batch.len());
        for (name, document) in batch {
            let table = self.tables.entry(name.to_string()).or_default();
            ids.push((name.to_string(), table.push(document)));
        }

        if let Err(e) = self.flush() {
            for (name, id) in ids.iter().rev() {
                if let Some(table) = self.tables.get_mut(name) {
                    table.documents.remove(id);
                }
            }
            for (name, last_id) in snapshot {
                match last_id {
                    Some(last_id) => {
                        if let Some(table) = self.tables.get_mut(&name) {
                            table.last_id = last_id;
                        }
                    }
                    None => {
                        self.tables.remove(&name);
                    }
                }
            }
            return Err(e);
        }

        Ok(ids.into_iter().map(|(_, id)| id).collect())
    }

    /// The backend this database reads from and writes to.
    #[must_use]
    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// Write the full image. Volatile backends are only read at open; the
    /// tables themselves are the live copy.
    fn flush(&mut self) -> Result<(), StoreError> {
        if !self.storage.is_persistent() {
            return Ok(());
        }
        let image: Map<String, Value> = self
            .tables
            .iter()
            .map(|(name, table)| (name.clone(), table.to_value()))
            .collect();
        self.storage.write(&Value::Object(image))
    }
}

// =============================================================================
// TESTS
// =============================================================================
