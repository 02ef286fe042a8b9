//! # Triple Index Set
//!
//! Three tables hold one record per stored triple, each nesting the
//! triple's key strings in a different order:
//!
//! ```text
//! spo: {"index": {<s>: {<p>: <o>}}, "s": .., "p": .., "o": ..}
//! pos: {"index": {<p>: {<o>: <s>}}, "s": .., "p": .., "o": ..}
//! osp: {"index": {<o>: {<s>: <p>}}, "s": .., "p": .., "o": ..}
//! ```
//!
//! For every pattern shape the bound positions form a prefix of one
//! table's key order, so one table answers it with a prefix-existence
//! check on the nest:
//!
//! | Pattern | Table | Lookup                  |
//! |---------|-------|-------------------------|
//! | b,b,b   | spo   | s -> p == o             |
//! | b,b,*   | spo   | s -> p exists           |
//! | b,*,b   | osp   | o -> s exists           |
//! | b,*,*   | spo   | s exists                |
//! | *,b,b   | pos   | p -> o exists           |
//! | *,b,*   | pos   | p exists                |
//! | *,*,b   | osp   | o exists                |
//! | *,*,*   | spo   | full scan               |
//!
//! Key strings conflate term kinds (the URI `x` and the literal `"x"` share
//! a key), so a nest match only selects a candidate. Each candidate is
//! decoded from its `s`/`p`/`o` fields and checked against the pattern's
//! typed terms before it is yielded.
//!
//! The three tables are written by a single storage write per insert.
//! There is no repair path if the medium is left half-written.

use crate::codec::{decode_value, encode_value};
use crate::database::{Database, Document};
use crate::primitives::{
    INDEX_FIELD, OBJECT_FIELD, OSP_TABLE, POS_TABLE, PREDICATE_FIELD, SPO_TABLE, SUBJECT_FIELD,
};
use crate::storage::StorageBackend;
use crate::{PatternShape, StoreError, Term, Triple, TriplePattern};
use serde_json::{Map, Value};

// =============================================================================
// TABLES & DISPATCH
// =============================================================================

/// One of the three index orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexTable {
    Spo,
    Pos,
    Osp,
}

impl IndexTable {
    pub const ALL: [Self; 3] = [Self::Spo, Self::Pos, Self::Osp];

    /// Persisted table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spo => SPO_TABLE,
            Self::Pos => POS_TABLE,
            Self::Osp => OSP_TABLE,
        }
    }

    /// Arrange (subject, predicate, object) in this table's key order.
    pub fn order<T>(self, subject: T, predicate: T, object: T) -> [T; 3] {
        match self {
            Self::Spo => [subject, predicate, object],
            Self::Pos => [predicate, object, subject],
            Self::Osp => [object, subject, predicate],
        }
    }
}

/// Table chosen for a pattern shape.
#[must_use]
pub fn table_for(shape: PatternShape) -> IndexTable {
    match (shape.subject, shape.predicate, shape.object) {
        (true, true, _) | (true, false, false) | (false, false, false) => IndexTable::Spo,
        (false, true, _) => IndexTable::Pos,
        (true, false, true) | (false, false, true) => IndexTable::Osp,
    }
}

/// Key strings of the pattern's bound positions, in `table` order.
///
/// Stops at the first wildcard; for the table chosen by `table_for` this
/// covers every bound position.
fn key_prefix(table: IndexTable, pattern: &TriplePattern) -> Vec<String> {
    table
        .order(&pattern.subject, &pattern.predicate, &pattern.object)
        .into_iter()
        .map_while(|term| term.as_ref().map(|t| t.key().to_string()))
        .collect()
}

/// Prefix-existence check on a record's nest. Three keys means the full
/// path with the leaf value equal to the third key.
fn nest_matches(record: &Document, keys: &[String]) -> bool {
    let Some(Value::Object(nest)) = record.get(INDEX_FIELD) else {
        return false;
    };
    match keys {
        [] => true,
        [k1] => nest.contains_key(k1),
        [k1, k2] => nest
            .get(k1)
            .and_then(Value::as_object)
            .is_some_and(|inner| inner.contains_key(k2)),
        [k1, k2, k3] => nest
            .get(k1)
            .and_then(|inner| inner.get(k2))
            .and_then(Value::as_str)
            == Some(k3.as_str()),
        _ => false,
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Encoded terms of one triple, shared by its three records.
struct EncodedTriple {
    subject: Value,
    predicate: Value,
    object: Value,
}

impl EncodedTriple {
    fn new(triple: &Triple) -> Result<Self, StoreError> {
        Ok(Self {
            subject: encode_value(&triple.subject)?,
            predicate: encode_value(&triple.predicate)?,
            object: encode_value(&triple.object)?,
        })
    }

    fn record(&self, table: IndexTable, triple: &Triple) -> Document {
        let [k1, k2, k3] = table
            .order(&triple.subject, &triple.predicate, &triple.object)
            .map(Term::key);

        let mut inner = Map::new();
        inner.insert(k2.to_string(), Value::String(k3.to_string()));
        let mut nest = Map::new();
        nest.insert(k1.to_string(), Value::Object(inner));

        let mut record = Document::new();
        record.insert(INDEX_FIELD.to_string(), Value::Object(nest));
        record.insert(SUBJECT_FIELD.to_string(), self.subject.clone());
        record.insert(PREDICATE_FIELD.to_string(), self.predicate.clone());
        record.insert(OBJECT_FIELD.to_string(), self.object.clone());
        record
    }

    /// Same triple: every encoded term equal.
    fn same_as(&self, record: &Document) -> bool {
        record.get(SUBJECT_FIELD) == Some(&self.subject)
            && record.get(PREDICATE_FIELD) == Some(&self.predicate)
            && record.get(OBJECT_FIELD) == Some(&self.object)
    }
}

/// Rebuild the triple a record was written for.
fn reconstruct(record: &Document) -> Result<Triple, StoreError> {
    Ok(Triple::new(
        decode_value(field(record, SUBJECT_FIELD)?)?,
        decode_value(field(record, PREDICATE_FIELD)?)?,
        decode_value(field(record, OBJECT_FIELD)?)?,
    ))
}

fn field<'r>(record: &'r Document, name: &str) -> Result<&'r Value, StoreError> {
    record.get(name).ok_or_else(|| {
        StoreError::Deserialization(format!("Index record is missing field '{}'", name))
    })
}

// =============================================================================
// INDEX SET
// =============================================================================

/// The SPO / POS / OSP tables over one document database.
#[derive(Debug)]
pub struct TripleIndexSet {
    db: Database,
}

impl TripleIndexSet {
    /// Load the index tables from `storage`, creating any that are missing.
    pub fn open(storage: StorageBackend) -> Result<Self, StoreError> {
        let mut db = Database::open(storage)?;
        db.ensure_tables(&IndexTable::ALL.map(IndexTable::name))?;
        Ok(Self { db })
    }

    /// True if the storage held no database before this set was opened.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.db.was_created()
    }

    /// Check if the tables are backed by a file.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.db.is_persistent()
    }

    /// Number of stored triples (records in `spo`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.table_len(IndexTable::Spo)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in one table.
    #[must_use]
    pub fn table_len(&self, table: IndexTable) -> usize {
        self.db.table(table.name()).map_or(0, |t| t.len())
    }

    /// Check whether `table` holds a record for exactly this triple.
    pub fn contains_in(&self, table: IndexTable, triple: &Triple) -> Result<bool, StoreError> {
        let encoded = EncodedTriple::new(triple)?;
        let keys = key_prefix(table, &TriplePattern::exact(triple));
        Ok(self.db.table(table.name()).is_some_and(|t| {
            t.contains(|record| nest_matches(record, &keys) && encoded.same_as(record))
        }))
    }

    /// Check whether the triple is stored.
    pub fn contains(&self, triple: &Triple) -> Result<bool, StoreError> {
        self.contains_in(IndexTable::Spo, triple)
    }

    /// Store a triple unless an identical one exists.
    ///
    /// Returns `true` when the triple was new.
    pub fn insert(&mut self, triple: &Triple) -> Result<bool, StoreError> {
        if self.contains(triple)? {
            return Ok(false);
        }

        let encoded = EncodedTriple::new(triple)?;
        let batch = IndexTable::ALL
            .iter()
            .map(|table| (table.name(), encoded.record(*table, triple)))
            .collect();
        self.db.insert_many(batch)?;
        Ok(true)
    }

    /// Lazily yield stored triples matching `pattern`.
    pub fn scan(&self, pattern: &TriplePattern) -> Matches<'_> {
        let shape = pattern.shape();
        let table = table_for(shape);
        tracing::trace!(shape = %shape, table = table.name(), "index lookup");
        self.scan_table(table, pattern)
    }

    /// Answer `pattern` from a specific table.
    ///
    /// Only the key prefix the table can serve is checked against the
    /// nest; remaining bound positions are checked on the decoded triple.
    pub fn scan_table(&self, table: IndexTable, pattern: &TriplePattern) -> Matches<'_> {
        let records: Box<dyn Iterator<Item = &Document> + '_> = match self.db.table(table.name())
        {
            Some(t) => Box::new(t.all().map(|(_, record)| record)),
            None => Box::new(std::iter::empty()),
        };
        Matches {
            records,
            keys: key_prefix(table, pattern),
            pattern: pattern.clone(),
        }
    }
}

/// Iterator over the triples matching a pattern.
///
/// Finite and not restartable; scan again for a fresh pass.
pub struct Matches<'a> {
    records: Box<dyn Iterator<Item = &'a Document> + 'a>,
    keys: Vec<String>,
    pattern: TriplePattern,
}

impl Iterator for Matches<'_> {
    type Item = Result<Triple, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            if !nest_matches(record, &self.keys) {
                continue;
            }
            match reconstruct(record) {
                Ok(triple) if self.pattern.matches(&triple) => return Some(Ok(triple)),
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl std::fmt::Debug for Matches<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matches")
            .field("keys", &self.keys)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EX: &str = "https://example.com/";
    const NAME: &str = "https://schema.org/name";
    const KNOWS: &str = "https://schema.org/knows";

    fn ex(local: &str) -> Term {
        Term::uri(format!("{}{}", EX, local))
    }

    fn memory_index() -> TripleIndexSet {
        TripleIndexSet::open(StorageBackend::default()).expect("open")
    }

    fn collect(index: &TripleIndexSet, pattern: &TriplePattern) -> Vec<Triple> {
        index
            .scan(pattern)
            .collect::<Result<Vec<_>, _>>()
            .expect("scan")
    }

    #[test]
    fn dispatch_table_matches_layout() {
        let expected = [
            IndexTable::Spo, // b,b,b
            IndexTable::Spo, // b,b,*
            IndexTable::Osp, // b,*,b
            IndexTable::Spo, // b,*,*
            IndexTable::Pos, // *,b,b
            IndexTable::Pos, // *,b,*
            IndexTable::Osp, // *,*,b
            IndexTable::Spo, // *,*,*
        ];
        for (shape, table) in PatternShape::ALL.into_iter().zip(expected) {
            assert_eq!(table_for(shape), table, "shape {}", shape);
        }
    }

    #[test]
    fn bound_positions_form_prefix_of_chosen_table() {
        let full = TriplePattern::exact(&Triple::new(ex("a"), Term::uri(NAME), ex("b")));
        for shape in PatternShape::ALL {
            let pattern = TriplePattern::new(
                full.subject.clone().filter(|_| shape.subject),
                full.predicate.clone().filter(|_| shape.predicate),
                full.object.clone().filter(|_| shape.object),
            );
            let bound = [shape.subject, shape.predicate, shape.object]
                .iter()
                .filter(|b| **b)
                .count();
            assert_eq!(key_prefix(table_for(shape), &pattern).len(), bound);
        }
    }

    #[test]
    fn record_layout_per_table() {
        let triple = Triple::new(ex("a"), Term::uri(NAME), Term::literal("Alice"));
        let encoded = EncodedTriple::new(&triple).expect("encode");

        let pos = encoded.record(IndexTable::Pos, &triple);
        assert_eq!(
            pos.get(INDEX_FIELD),
            Some(&json!({"https://schema.org/name": {"Alice": "https://example.com/a"}}))
        );
        assert_eq!(
            pos.get(OBJECT_FIELD),
            Some(&json!({"type": "literal", "value": "Alice", "datatype": "", "language": ""}))
        );
    }

    #[test]
    fn insert_writes_all_three_tables_once() {
        let mut index = memory_index();
        let triple = Triple::new(ex("a"), Term::uri(NAME), Term::literal("Alice"));

        assert!(index.insert(&triple).expect("insert"));
        assert!(!index.insert(&triple).expect("insert again"));

        for table in IndexTable::ALL {
            assert_eq!(index.table_len(table), 1);
            assert!(index.contains_in(table, &triple).expect("contains"));
        }
    }

    #[test]
    fn same_key_different_kind_are_distinct_triples() {
        let mut index = memory_index();
        let as_uri = Triple::new(ex("a"), Term::uri(KNOWS), Term::uri("x"));
        let as_literal = Triple::new(ex("a"), Term::uri(KNOWS), Term::literal("x"));

        assert!(index.insert(&as_uri).expect("insert"));
        assert!(index.insert(&as_literal).expect("insert"));
        assert_eq!(index.len(), 2);

        let found = collect(&index, &TriplePattern::new(None, None, Some(Term::literal("x"))));
        assert_eq!(found, vec![as_literal]);
    }

    #[test]
    fn subject_then_object_yields_one_triple_per_predicate() {
        let mut index = memory_index();
        let first = Triple::new(ex("a"), Term::uri(NAME), ex("b"));
        let second = Triple::new(ex("a"), Term::uri(KNOWS), ex("b"));
        index.insert(&first).expect("insert");
        index.insert(&second).expect("insert");
        index
            .insert(&Triple::new(ex("c"), Term::uri(KNOWS), ex("b")))
            .expect("insert");

        let found = collect(&index, &TriplePattern::new(Some(ex("a")), None, Some(ex("b"))));
        assert_eq!(found, vec![first, second]);
    }

    #[test]
    fn term_named_like_reconstruction_field() {
        let mut index = memory_index();
        let triple = Triple::new(Term::uri("s"), Term::uri("p"), Term::literal("o"));
        index.insert(&triple).expect("insert");

        assert_eq!(collect(&index, &TriplePattern::any()), vec![triple.clone()]);
        assert_eq!(
            collect(&index, &TriplePattern::new(Some(Term::uri("s")), None, None)),
            vec![triple]
        );
    }

    #[test]
    fn corrupted_record_surfaces_error() {
        let mut index = memory_index();
        let mut record = Document::new();
        record.insert(INDEX_FIELD.to_string(), json!({"a": {"p": "o"}}));
        record.insert(SUBJECT_FIELD.to_string(), json!({"type": "formula", "value": "a"}));
        record.insert(PREDICATE_FIELD.to_string(), json!({"type": "uri", "value": "p"}));
        record.insert(OBJECT_FIELD.to_string(), json!({"type": "uri", "value": "o"}));
        index.db.insert(SPO_TABLE, record).expect("raw insert");

        let results: Vec<_> = index.scan(&TriplePattern::any()).collect();
        assert!(matches!(
            results.as_slice(),
            [Err(StoreError::UnknownTermType(tag))] if tag == "formula"
        ));
    }

    #[test]
    fn literal_with_empty_datatype_found_by_every_shape() {
        let mut index = memory_index();
        let object = Term::Literal {
            value: "x".to_string(),
            datatype: Some(String::new()),
            language: None,
        };
        let triple = Triple::new(ex("a"), Term::uri(NAME), object);
        assert!(index.insert(&triple).expect("insert"));
        assert!(!index.insert(&Triple::new(ex("a"), Term::uri(NAME), Term::literal("x"))).expect("insert"));

        let full = TriplePattern::exact(&triple);
        for shape in PatternShape::ALL {
            let pattern = TriplePattern::new(
                full.subject.clone().filter(|_| shape.subject),
                full.predicate.clone().filter(|_| shape.predicate),
                full.object.clone().filter(|_| shape.object),
            );
            assert_eq!(collect(&index, &pattern), vec![triple.clone()], "shape {}", shape);
        }
    }
}
