//! # Store Facade
//!
//! The public lifecycle around a `TripleIndexSet`:
//!
//! ```text
//! Unopened --open--> Open --close--> Closed
//! ```
//!
//! `Closed` is terminal for a handle. `close` on an unopened or closed
//! handle does nothing.
//!
//! ## Storage Kinds
//!
//! - `Durable`: tables persisted to a JSON file named by the configuration
//! - `Ephemeral`: tables held in memory; the configuration is ignored

use crate::index::{Matches, TripleIndexSet};
use crate::namespace::{Bindings, NamespaceRegistry};
use crate::storage::{JsonStorage, MemoryStorage, StorageBackend};
use crate::{StoreError, Triple, TriplePattern};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// STORE CONTRACT
// =============================================================================

/// The operations a host graph layer drives a store through.
pub trait Store {
    /// Open the store. Durable stores need a non-empty location.
    fn open(&mut self, configuration: Option<&str>) -> Result<OpenStatus, StoreError>;

    /// Release the underlying storage. No-op unless open.
    fn close(&mut self);

    /// Insert a triple if not already stored. Returns `true` when inserted.
    fn add(&mut self, triple: &Triple) -> Result<bool, StoreError>;

    /// Insert a quoted (hypothetical) triple.
    fn add_quoted(&mut self, triple: &Triple) -> Result<bool, StoreError>;

    /// Remove triples matching a pattern.
    fn remove(&mut self, pattern: &TriplePattern) -> Result<(), StoreError>;

    /// Lazily yield `(triple, context)` for every stored triple matching
    /// `pattern`. `context` is handed back unchanged with each triple.
    fn triples<'a, C: Clone + 'a>(
        &'a self,
        pattern: &TriplePattern,
        context: C,
    ) -> Result<Triples<'a, C>, StoreError>;

    /// Number of distinct stored triples.
    fn count(&self) -> Result<usize, StoreError>;

    /// Delete the storage named by `configuration`.
    fn destroy(&mut self, configuration: Option<&str>) -> Result<(), StoreError>;

    /// Reclaim unused space.
    fn gc(&mut self);

    /// Bind a prefix to a namespace for the lifetime of the handle.
    fn bind(&mut self, prefix: &str, namespace: &str);

    /// Namespace bound to `prefix`.
    fn namespace(&self, prefix: &str) -> Option<&str>;

    /// Prefix bound to `namespace`.
    fn prefix(&self, namespace: &str) -> Option<&str>;

    /// All bindings in insertion order.
    fn namespaces(&self) -> Bindings<'_>;
}

// =============================================================================
// CONFIGURATION TYPES
// =============================================================================

/// Where a store keeps its tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StoreKind {
    /// JSON file on disk.
    #[default]
    Durable,
    /// In-memory only.
    Ephemeral,
}

impl FromStr for StoreKind {
    type Err = StoreError;

    /// Accepts the backend names used by the CLI and the plugin names the
    /// store registers under in graph hosts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" | "durable" | "TinyDB" => Ok(Self::Durable),
            "memory" | "ephemeral" | "TinyDBMemory" => Ok(Self::Ephemeral),
            other => Err(StoreError::InvalidConfiguration(format!(
                "Unknown store kind '{}' (expected 'json' or 'memory')",
                other
            ))),
        }
    }
}

impl TryFrom<String> for StoreKind {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Durable => f.write_str("json"),
            Self::Ephemeral => f.write_str("memory"),
        }
    }
}

/// Store settings as read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    /// Database file for durable stores.
    #[serde(default)]
    pub location: Option<PathBuf>,
}

/// Successful outcome of `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStatus {
    /// No database existed; empty tables were created.
    Created,
    /// An existing database was loaded.
    Existing,
}

/// Feature flags a host can inspect before choosing an API path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub context_aware: bool,
    pub formula_aware: bool,
    pub transaction_aware: bool,
    pub graph_aware: bool,
}

// =============================================================================
// TRIPLE STORE
// =============================================================================

#[derive(Debug)]
enum State {
    Unopened,
    Open(TripleIndexSet),
    Closed,
}

/// Triple store over the SPO/POS/OSP document tables.
///
/// One handle owns its storage exclusively; concurrent handles on the same
/// file are not coordinated.
#[derive(Debug)]
pub struct TripleStore {
    kind: StoreKind,
    state: State,
    namespaces: NamespaceRegistry,
}

impl TripleStore {
    /// This store answers no context, formula, transaction or graph APIs.
    pub const CAPABILITIES: Capabilities = Capabilities {
        context_aware: false,
        formula_aware: false,
        transaction_aware: false,
        graph_aware: false,
    };

    /// Create an unopened handle of the given kind.
    #[must_use]
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            state: State::Unopened,
            namespaces: NamespaceRegistry::new(),
        }
    }

    /// Create an unopened JSON-file store.
    #[must_use]
    pub fn durable() -> Self {
        Self::new(StoreKind::Durable)
    }

    /// Create an unopened in-memory store.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::new(StoreKind::Ephemeral)
    }

    /// Create a handle from a configuration and open it.
    pub fn open_with(config: &StoreConfig) -> Result<(Self, OpenStatus), StoreError> {
        let mut store = Self::new(config.kind);
        let location = match &config.location {
            Some(path) => Some(path.to_str().ok_or_else(|| {
                StoreError::InvalidConfiguration(format!(
                    "Location '{}' is not valid UTF-8",
                    path.display()
                ))
            })?),
            None => None,
        };
        let status = store.open(location)?;
        Ok((store, status))
    }

    #[must_use]
    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Feature flags of this store.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    /// Collect the triples matching `pattern`.
    pub fn matching(&self, pattern: &TriplePattern) -> Result<Vec<Triple>, StoreError> {
        self.index()?.scan(pattern).collect()
    }

    /// Check whether an identical triple is stored.
    pub fn contains(&self, triple: &Triple) -> Result<bool, StoreError> {
        self.index()?.contains(triple)
    }

    /// SPARQL query pass-through. This store has no query engine.
    pub fn query(&self, _query: &str) -> Result<Vec<Triple>, StoreError> {
        Err(StoreError::NotImplemented("query"))
    }

    /// SPARQL update pass-through. This store has no update engine.
    pub fn update(&mut self, _update: &str) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented("update"))
    }

    fn index(&self) -> Result<&TripleIndexSet, StoreError> {
        match &self.state {
            State::Open(index) => Ok(index),
            State::Unopened | State::Closed => Err(StoreError::NotOpen),
        }
    }

    fn index_mut(&mut self) -> Result<&mut TripleIndexSet, StoreError> {
        match &mut self.state {
            State::Open(index) => Ok(index),
            State::Unopened | State::Closed => Err(StoreError::NotOpen),
        }
    }

    fn backend(&self, configuration: Option<&str>) -> Result<StorageBackend, StoreError> {
        match self.kind {
            StoreKind::Ephemeral => Ok(StorageBackend::Memory(MemoryStorage::new())),
            StoreKind::Durable => {
                let location = configuration
                    .filter(|c| !c.is_empty())
                    .ok_or(StoreError::MissingConfiguration)?;
                Ok(StorageBackend::Json(JsonStorage::open(location)?))
            }
        }
    }
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::ephemeral()
    }
}

impl Store for TripleStore {
    fn open(&mut self, configuration: Option<&str>) -> Result<OpenStatus, StoreError> {
        match self.state {
            State::Open(_) => return Err(StoreError::AlreadyOpen),
            State::Closed => return Err(StoreError::Closed),
            State::Unopened => {}
        }

        let index = TripleIndexSet::open(self.backend(configuration)?)?;
        let status = if index.was_created() {
            OpenStatus::Created
        } else {
            OpenStatus::Existing
        };
        tracing::debug!(
            kind = %self.kind,
            location = configuration.unwrap_or_default(),
            triples = index.len(),
            ?status,
            "store opened"
        );
        self.state = State::Open(index);
        Ok(status)
    }

    fn close(&mut self) {
        if let State::Open(index) = &self.state {
            tracing::debug!(kind = %self.kind, triples = index.len(), "store closed");
            self.state = State::Closed;
            self.namespaces.clear();
        }
    }

    fn add(&mut self, triple: &Triple) -> Result<bool, StoreError> {
        let inserted = self.index_mut()?.insert(triple)?;
        tracing::trace!(%triple, inserted, "add");
        Ok(inserted)
    }

    fn add_quoted(&mut self, _triple: &Triple) -> Result<bool, StoreError> {
        Err(StoreError::UnsupportedOperation(
            "store is not formula-aware; quoted triples cannot be added".to_string(),
        ))
    }

    fn remove(&mut self, _pattern: &TriplePattern) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented("remove"))
    }

    fn triples<'a, C: Clone + 'a>(
        &'a self,
        pattern: &TriplePattern,
        context: C,
    ) -> Result<Triples<'a, C>, StoreError> {
        Ok(Triples {
            matches: self.index()?.scan(pattern),
            context,
        })
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.index()?.len())
    }

    fn destroy(&mut self, _configuration: Option<&str>) -> Result<(), StoreError> {
        Err(StoreError::NotImplemented("destroy"))
    }

    fn gc(&mut self) {}

    fn bind(&mut self, prefix: &str, namespace: &str) {
        self.namespaces.bind(prefix, namespace);
    }

    fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.namespace(prefix)
    }

    fn prefix(&self, namespace: &str) -> Option<&str> {
        self.namespaces.prefix(namespace)
    }

    fn namespaces(&self) -> Bindings<'_> {
        self.namespaces.namespaces()
    }
}

/// Lazy `(triple, context)` sequence returned by `Store::triples`.
#[derive(Debug)]
pub struct Triples<'a, C> {
    matches: Matches<'a>,
    context: C,
}

impl<C: Clone> Iterator for Triples<'_, C> {
    type Item = Result<(Triple, C), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches
            .next()
            .map(|result| result.map(|triple| (triple, self.context.clone())))
    }
}

// =============================================================================
// TESTS
// =============================================================================
