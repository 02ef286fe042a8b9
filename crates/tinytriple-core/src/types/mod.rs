//! # Core Type Definitions
//!
//! This module contains the data model shared by every layer of the store:
//! - RDF terms (`Term`)
//! - Statements and query shapes (`Triple`, `TriplePattern`, `PatternShape`)
//! - Error types (`StoreError`)
//!
//! ## Term Identity
//!
//! Two terms are equal only when their kind, value, datatype and language
//! all agree. An empty datatype or language is the same as an absent one,
//! matching the persisted form. The bare textual value (`Term::key`) is what the index tables
//! nest on, so distinct terms may share a key; callers that need exact
//! matches compare `Term`s, never keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

// =============================================================================
// TERMS
// =============================================================================

/// An RDF term: URI reference, blank node or literal.
///
/// A literal carries at most one of `datatype` and `language`. The store
/// does not enforce this; it is the caller's responsibility.
/// `Some("")` in either field means the same as `None`.
#[derive(Debug, Clone)]
pub enum Term {
    /// URI reference.
    Uri(String),
    /// Blank node with an opaque, store-local identifier.
    Blank(String),
    /// Literal with optional datatype URI or language tag.
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    /// Create a URI term.
    pub fn uri(value: impl Into<String>) -> Self {
        Self::Uri(value.into())
    }

    /// Create a blank node term.
    pub fn blank(value: impl Into<String>) -> Self {
        Self::Blank(value.into())
    }

    /// Create a plain literal (no datatype, no language).
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a literal with a datatype URI.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: non_empty(datatype.into()),
            language: None,
        }
    }

    /// Create a literal with a language tag.
    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: non_empty(language.into()),
        }
    }

    /// The textual form of the term, used as a nested lookup key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Uri(value) | Self::Blank(value) | Self::Literal { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_uri(&self) -> bool {
        matches!(self, Self::Uri(_))
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Datatype URI of a literal, if any.
    #[must_use]
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Self::Literal { datatype, .. } => datatype.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Language tag of a literal, if any.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Literal { language, .. } => language.as_deref().filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// (kind, value, datatype, language) with absent fields as `""`.
    fn identity(&self) -> (u8, &str, &str, &str) {
        match self {
            Self::Uri(value) => (0, value, "", ""),
            Self::Blank(value) => (1, value, "", ""),
            Self::Literal { value, .. } => (
                2,
                value,
                self.datatype().unwrap_or_default(),
                self.language().unwrap_or_default(),
            ),
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

/// Empty strings stand for "absent" in the persisted form; normalize here so
/// constructed terms compare equal to decoded ones.
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// N-Triples rendering.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(value) => write!(f, "<{}>", value),
            Self::Blank(value) => write!(f, "_:{}", value),
            Self::Literal { value, .. } => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")?;
                if let Some(lang) = self.language() {
                    write!(f, "@{}", lang)
                } else if let Some(dt) = self.datatype() {
                    write!(f, "^^<{}>", dt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

// =============================================================================
// TRIPLES
// =============================================================================

/// A (subject, predicate, object) statement.
///
/// Subjects are URIs or blank nodes and predicates are URIs; like the
/// literal datatype/language rule, this is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    /// Create a new triple.
    #[must_use]
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// N-Triples statement rendering (`s p o .`).
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// A triple with zero or more wildcard (`None`) positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Term>,
    pub predicate: Option<Term>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// Create a pattern from optional components.
    #[must_use]
    pub fn new(subject: Option<Term>, predicate: Option<Term>, object: Option<Term>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The fully wildcarded pattern `(*, *, *)`.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Pattern that matches exactly one triple.
    #[must_use]
    pub fn exact(triple: &Triple) -> Self {
        Self {
            subject: Some(triple.subject.clone()),
            predicate: Some(triple.predicate.clone()),
            object: Some(triple.object.clone()),
        }
    }

    /// Which positions are bound.
    #[must_use]
    pub fn shape(&self) -> PatternShape {
        PatternShape {
            subject: self.subject.is_some(),
            predicate: self.predicate.is_some(),
            object: self.object.is_some(),
        }
    }

    /// True when every bound position equals the triple's term.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        bound_eq(self.subject.as_ref(), &triple.subject)
            && bound_eq(self.predicate.as_ref(), &triple.predicate)
            && bound_eq(self.object.as_ref(), &triple.object)
    }
}

fn bound_eq(bound: Option<&Term>, term: &Term) -> bool {
    bound.is_none_or(|b| b == term)
}

impl From<&Triple> for TriplePattern {
    fn from(triple: &Triple) -> Self {
        Self::exact(triple)
    }
}

/// Bound (`true`) / wildcard (`false`) flags of a pattern; one of eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternShape {
    pub subject: bool,
    pub predicate: bool,
    pub object: bool,
}

impl PatternShape {
    /// All eight shapes, `(b,b,b)` first and `(*,*,*)` last.
    pub const ALL: [Self; 8] = [
        Self::from_bits(true, true, true),
        Self::from_bits(true, true, false),
        Self::from_bits(true, false, true),
        Self::from_bits(true, false, false),
        Self::from_bits(false, true, true),
        Self::from_bits(false, true, false),
        Self::from_bits(false, false, true),
        Self::from_bits(false, false, false),
    ];

    const fn from_bits(subject: bool, predicate: bool, object: bool) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for PatternShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bound: bool| if bound { "b" } else { "*" };
        write!(
            f,
            "({},{},{})",
            flag(self.subject),
            flag(self.predicate),
            flag(self.object)
        )
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the triple store.
///
/// - No silent failures: every error reaches the immediate caller
/// - No retries: storage failures propagate unchanged
#[derive(Debug, Error)]
pub enum StoreError {
    /// Durable open requested without a location.
    #[error("Durable store requires a non-empty configuration location")]
    MissingConfiguration,

    /// The configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Input named a term kind other than URI, blank node or literal.
    #[error("Unsupported term kind: {0}")]
    UnsupportedTermKind(String),

    /// A stored term document carried an unrecognized type tag.
    #[error("Unknown term type: {0:?}")]
    UnknownTermType(String),

    /// The store does not model the requested operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The operation is part of the store contract but has no implementation.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// The store handle has not been opened, or has been closed.
    #[error("Store is not open")]
    NotOpen,

    /// `open` called on a handle that is already open.
    #[error("Store is already open")]
    AlreadyOpen,

    /// `open` called on a closed handle; closing is terminal.
    #[error("Store handle is closed and cannot be reopened")]
    Closed,

    /// Malformed term or statement syntax.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
