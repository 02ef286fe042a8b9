//! # tinytriple-core
//!
//! An embedded triple store that keeps RDF statements in a JSON document
//! database, either in a file or in memory, and answers triple patterns.
//!
//! ## Layers
//!
//! ```text
//! store      TripleStore: open/close lifecycle, add, triples, count, namespaces
//!   index    TripleIndexSet: SPO / POS / OSP tables, pattern dispatch
//!     codec  Term <-> {"type", "value", "datatype", "language"}
//!     database + storage   named JSON tables, file or memory backed
//! ```
//!
//! ## Example
//!
//! ```
//! use tinytriple_core::{Store, Term, Triple, TriplePattern, TripleStore};
//!
//! let mut store = TripleStore::ephemeral();
//! store.open(None).expect("open");
//!
//! let name = Term::uri("https://schema.org/name");
//! store
//!     .add(&Triple::new(Term::uri("https://example.com/a"), name.clone(), Term::literal("Alice")))
//!     .expect("add");
//!
//! let found = store
//!     .matching(&TriplePattern::new(None, Some(name), None))
//!     .expect("query");
//! assert_eq!(found.len(), 1);
//! ```
//!
//! ## Constraints
//!
//! - Synchronous and single-threaded; a handle owns its storage exclusively
//! - No transactions, no deletion, no contexts
//! - Errors are returned to the caller, never logged and dropped

// =============================================================================
// MODULES
// =============================================================================

pub mod codec;
pub mod database;
pub mod formats;
pub mod index;
pub mod namespace;
pub mod primitives;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{PatternShape, StoreError, Term, Triple, TriplePattern};

// =============================================================================
// RE-EXPORTS: Store
// =============================================================================

pub use codec::{TermDocument, decode, encode};
pub use database::{Database, DocId, Document, Table};
pub use index::{IndexTable, Matches, TripleIndexSet, table_for};
pub use namespace::{Bindings, NamespaceRegistry};
pub use storage::{DocumentStorage, JsonStorage, MemoryStorage, StorageBackend};
pub use store::{
    Capabilities, OpenStatus, Store, StoreConfig, StoreKind, TripleStore, Triples,
};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{parse_line, parse_pattern_term, parse_term};
