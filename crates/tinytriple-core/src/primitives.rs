//! # Store Primitives
//!
//! Fixed names compiled into the store. They define the persisted layout,
//! so changing any of them makes existing database files unreadable.
//!
//! ## Primitives
//!
//! 1. **Table names**: one collection per index ordering.
//! 2. **Record fields**: where each record keeps its lookup nest and terms.
//! 3. **Term tags**: the `type` values of an encoded term.

/// Table keyed subject -> predicate -> object.
pub const SPO_TABLE: &str = "spo";

/// Table keyed predicate -> object -> subject.
pub const POS_TABLE: &str = "pos";

/// Table keyed object -> subject -> predicate.
pub const OSP_TABLE: &str = "osp";

/// Record field holding the two-level lookup nest.
///
/// The nest sits under its own key so that a term whose textual value is
/// `"s"`, `"p"` or `"o"` cannot shadow the reconstruction fields.
pub const INDEX_FIELD: &str = "index";

/// Record field holding the encoded subject.
pub const SUBJECT_FIELD: &str = "s";

/// Record field holding the encoded predicate.
pub const PREDICATE_FIELD: &str = "p";

/// Record field holding the encoded object.
pub const OBJECT_FIELD: &str = "o";

/// Tag of an encoded URI term.
pub const URI_TAG: &str = "uri";

/// Tag of an encoded blank node.
pub const BLANK_TAG: &str = "blank";

/// Tag of an encoded literal.
pub const LITERAL_TAG: &str = "literal";

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum size of a database file read at open (256 MB).
///
/// The whole image is held in memory, so larger files are rejected up front.
pub const MAX_DATABASE_FILE_SIZE: u64 = 256 * 1024 * 1024;
