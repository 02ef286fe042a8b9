//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the store is INVALID.
//!
//! ## Tiers
//! - T0: Term Integrity
//! - T1: Lifecycle
//! - T2: Insert & Pattern Retrieval
//! - T3: Durable Storage

use tinytriple_core::{
    OpenStatus, Store, StoreConfig, StoreError, StoreKind, Term, Triple, TriplePattern,
    TripleStore, parse_line,
};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

fn ex(local: &str) -> Term {
    Term::uri(format!("https://example.com/{}", local))
}

fn sdo(local: &str) -> Term {
    Term::uri(format!("https://schema.org/{}", local))
}

fn open_ephemeral() -> TripleStore {
    let mut store = TripleStore::ephemeral();
    store.open(None).expect("open");
    store
}

/// Two people with typed, tagged and blank-node statements.
const PEOPLE: &str = r#"
<https://example.com/person-1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Person> .
<https://example.com/person-1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Thing> .
<https://example.com/person-1> <https://schema.org/name> "Person 1" .
<https://example.com/person-1> <https://schema.org/jobTitle> "software engineer" .
<https://example.com/person-1> <https://schema.org/affiliation> _:org1 .
_:org1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Organization> .
_:org1 <https://schema.org/name> "RDFLib" .
<https://example.com/person-2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Person> .
<https://example.com/person-2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Thing> .
<https://example.com/person-2> <https://schema.org/name> "Person 2" .
<https://example.com/person-2> <https://schema.org/jobTitle> "ontologist"@en .
<https://example.com/person-2> <https://schema.org/affiliation> _:org2 .
_:org2 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://schema.org/Organization> .
_:org2 <https://schema.org/name> "W3C"^^<http://www.w3.org/2001/XMLSchema#string> .
"#;

fn load_people(store: &mut TripleStore) -> usize {
    let mut added = 0;
    for line in PEOPLE.lines() {
        if let Some(triple) = parse_line(line).expect("parse") {
            store.add(&triple).expect("add");
            added += 1;
        }
    }
    added
}

// =============================================================================
// TIER T0: TERM INTEGRITY
// =============================================================================

mod t0_term_integrity {
    use super::*;

    /// T0.1 (Scenario C): a language-tagged literal keeps its tag, gains no datatype.
    #[test]
    fn language_literal_roundtrips_through_store() {
        let mut store = open_ephemeral();
        let triple = Triple::new(ex("greeting"), sdo("text"), Term::lang_literal("bonjour", "fr"));
        store.add(&triple).expect("add");

        let found = store.matching(&TriplePattern::any()).expect("matching");
        assert_eq!(found, vec![triple]);
        assert_eq!(found[0].object.language(), Some("fr"));
        assert_eq!(found[0].object.datatype(), None);
    }

    /// T0.2: returned terms keep their kinds.
    #[test]
    fn returned_terms_are_typed() {
        let mut store = open_ephemeral();
        load_people(&mut store);

        for triple in store.matching(&TriplePattern::any()).expect("matching") {
            assert!(triple.subject.is_uri() || triple.subject.is_blank());
            assert!(triple.predicate.is_uri());
        }

        let typed = store
            .matching(&TriplePattern::new(None, None, Some(Term::typed_literal("W3C", XSD_STRING))))
            .expect("matching");
        assert_eq!(typed.len(), 1);
        assert!(typed[0].subject.is_blank());
    }

    /// T0.3: a plain literal does not match its typed twin.
    #[test]
    fn plain_and_typed_literals_distinct() {
        let mut store = open_ephemeral();
        load_people(&mut store);

        let plain = store
            .matching(&TriplePattern::new(None, None, Some(Term::literal("W3C"))))
            .expect("matching");
        assert!(plain.is_empty());
    }
}

// =============================================================================
// TIER T1: LIFECYCLE
// =============================================================================

mod t1_lifecycle {
    use super::*;

    /// T1.1: operations before open fail with NotOpen.
    #[test]
    fn before_open_fails() {
        let mut store = TripleStore::ephemeral();
        assert!(matches!(store.add(&Triple::new(ex("a"), sdo("p"), ex("b"))), Err(StoreError::NotOpen)));
        assert!(matches!(store.matching(&TriplePattern::any()), Err(StoreError::NotOpen)));
    }

    /// T1.2: operations after close fail; a second close does not.
    #[test]
    fn after_close_fails() {
        let mut store = open_ephemeral();
        store.add(&Triple::new(ex("a"), sdo("p"), ex("b"))).expect("add");
        store.close();
        store.close();

        assert!(store.is_closed());
        assert!(matches!(store.add(&Triple::new(ex("a"), sdo("p"), ex("c"))), Err(StoreError::NotOpen)));
        assert!(matches!(store.triples(&TriplePattern::any(), ()), Err(StoreError::NotOpen)));
        assert!(matches!(store.count(), Err(StoreError::NotOpen)));
    }

    /// T1.3 (Scenario D): durable open without a location.
    #[test]
    fn durable_without_location() {
        let mut store = TripleStore::durable();
        assert!(matches!(store.open(None), Err(StoreError::MissingConfiguration)));
    }

    /// T1.4 (Scenario D): durable open on an unusable location is an I/O error.
    #[test]
    fn durable_with_unusable_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = TripleStore::durable();

        let as_directory = dir.path().to_str().expect("utf-8 path");
        assert!(matches!(store.open(Some(as_directory)), Err(StoreError::Io(_))));

        let missing_parent = dir.path().join("nope").join("db.json");
        let missing_parent = missing_parent.to_str().expect("utf-8 path");
        assert!(matches!(store.open(Some(missing_parent)), Err(StoreError::Io(_))));
    }

    /// T1.5: destroy keeps its fail-fast contract.
    #[test]
    fn destroy_not_implemented() {
        let mut store = open_ephemeral();
        assert!(matches!(store.destroy(None), Err(StoreError::NotImplemented("destroy"))));
    }
}

// =============================================================================
// TIER T2: INSERT & PATTERN RETRIEVAL
// =============================================================================

mod t2_retrieval {
    use super::*;

    /// T2.1 (Scenario A): adding the same triple twice stores it once.
    #[test]
    fn duplicate_add_counts_once() {
        let mut store = open_ephemeral();
        let triple = Triple::new(ex("a"), Term::uri(RDF_TYPE), ex("Thing"));

        assert!(store.add(&triple).expect("first"));
        assert!(!store.add(&triple).expect("second"));
        assert_eq!(store.count().expect("count"), 1);
    }

    /// T2.2 (Scenario B): predicate-only and subject-only patterns.
    #[test]
    fn name_lookups() {
        let mut store = open_ephemeral();
        let alice = Triple::new(ex("a"), ex("name"), Term::literal("Alice"));
        let bob = Triple::new(ex("b"), ex("name"), Term::literal("Bob"));
        store.add(&alice).expect("add");
        store.add(&bob).expect("add");

        let by_predicate = store
            .matching(&TriplePattern::new(None, Some(ex("name")), None))
            .expect("matching");
        assert_eq!(by_predicate, vec![alice.clone(), bob]);

        let by_subject = store
            .matching(&TriplePattern::new(Some(ex("a")), None, None))
            .expect("matching");
        assert_eq!(by_subject, vec![alice]);
    }

    /// T2.3: each shape against the people dataset.
    #[test]
    fn every_shape_on_people() {
        let mut store = open_ephemeral();
        let added = load_people(&mut store);
        assert_eq!(store.count().expect("count"), added);

        let p1 = ex("person-1");
        let rdf_type = Term::uri(RDF_TYPE);
        let count = |s: Option<Term>, p: Option<Term>, o: Option<Term>| {
            store.matching(&TriplePattern::new(s, p, o)).expect("matching").len()
        };

        assert_eq!(count(Some(p1.clone()), Some(rdf_type.clone()), Some(sdo("Person"))), 1);
        assert_eq!(count(Some(p1.clone()), Some(rdf_type.clone()), None), 2);
        assert_eq!(count(Some(p1.clone()), None, Some(Term::literal("software engineer"))), 1);
        assert_eq!(count(Some(p1), None, None), 5);
        assert_eq!(count(None, Some(rdf_type.clone()), Some(sdo("Person"))), 2);
        assert_eq!(count(None, Some(rdf_type), None), 6);
        assert_eq!(count(None, None, Some(sdo("Thing"))), 2);
        assert_eq!(count(None, None, None), added);
    }

    /// T2.4: (s, *, o) finds the predicate it did not bind.
    #[test]
    fn subject_object_reveals_predicate() {
        let mut store = open_ephemeral();
        load_people(&mut store);

        let found = store
            .matching(&TriplePattern::new(
                Some(ex("person-1")),
                None,
                Some(Term::literal("software engineer")),
            ))
            .expect("matching");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].predicate, sdo("jobTitle"));
    }

    /// T2.5: a quoted triple is refused and nothing is stored.
    #[test]
    fn quoted_triple_refused() {
        let mut store = open_ephemeral();
        let triple = Triple::new(ex("a"), Term::uri(RDF_TYPE), ex("Thing"));

        assert!(matches!(store.add_quoted(&triple), Err(StoreError::UnsupportedOperation(_))));
        assert_eq!(store.count().expect("count"), 0);
    }

    /// T2.6: a fresh `triples` call rescans.
    #[test]
    fn triples_rescan_after_insert() {
        let mut store = open_ephemeral();
        store.add(&Triple::new(ex("a"), sdo("p"), ex("b"))).expect("add");
        assert_eq!(store.triples(&TriplePattern::any(), ()).expect("triples").count(), 1);

        store.add(&Triple::new(ex("a"), sdo("p"), ex("c"))).expect("add");
        assert_eq!(store.triples(&TriplePattern::any(), ()).expect("triples").count(), 2);
    }
}

// =============================================================================
// TIER T3: DURABLE STORAGE
// =============================================================================

mod t3_durable {
    use super::*;

    /// T3.1: triples survive close and reopen on a new handle.
    #[test]
    fn persists_across_handles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("people.json");
        let location = path.to_str().expect("utf-8 path");

        let added = {
            let mut store = TripleStore::durable();
            assert_eq!(store.open(Some(location)).expect("open"), OpenStatus::Created);
            assert!(path.is_file());
            let added = load_people(&mut store);
            store.close();
            added
        };

        let mut store = TripleStore::durable();
        assert_eq!(store.open(Some(location)).expect("reopen"), OpenStatus::Existing);
        assert_eq!(store.count().expect("count"), added);

        let orgs = store
            .matching(&TriplePattern::new(None, Some(Term::uri(RDF_TYPE)), Some(sdo("Organization"))))
            .expect("matching");
        assert_eq!(orgs.len(), 2);

        // dedup holds against reloaded records too
        let again = Triple::new(ex("person-1"), sdo("name"), Term::literal("Person 1"));
        assert!(!store.add(&again).expect("add"));
        assert_eq!(store.count().expect("count"), added);
    }

    /// T3.2: the file holds the three named tables, one record each per triple.
    #[test]
    fn file_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("db.json");
        let mut store = TripleStore::durable();
        store.open(Some(path.to_str().expect("utf-8 path"))).expect("open");
        store
            .add(&Triple::new(ex("a"), ex("name"), Term::literal("Alice")))
            .expect("add");

        let raw = std::fs::read_to_string(&path).expect("read");
        let image: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(
            image["spo"]["1"]["index"],
            serde_json::json!({"https://example.com/a": {"https://example.com/name": "Alice"}})
        );
        assert_eq!(
            image["osp"]["1"]["index"],
            serde_json::json!({"Alice": {"https://example.com/a": "https://example.com/name"}})
        );
        assert_eq!(image["pos"]["1"]["s"]["type"], "uri");
        assert_eq!(image["pos"]["1"]["o"]["language"], "");
    }

    /// T3.3: an empty existing file opens as a new database.
    #[test]
    fn empty_file_is_new_database() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        let mut store = TripleStore::durable();
        let status = store
            .open(Some(file.path().to_str().expect("utf-8 path")))
            .expect("open");
        assert_eq!(status, OpenStatus::Created);
    }

    /// T3.4: configuration-driven open.
    #[test]
    fn open_with_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StoreConfig {
            kind: StoreKind::Durable,
            location: Some(dir.path().join("cfg.json")),
        };
        let (store, status) = TripleStore::open_with(&config).expect("open");
        assert_eq!(status, OpenStatus::Created);
        assert_eq!(store.kind(), StoreKind::Durable);

        let missing = StoreConfig {
            kind: StoreKind::Durable,
            location: None,
        };
        assert!(matches!(
            TripleStore::open_with(&missing),
            Err(StoreError::MissingConfiguration)
        ));
    }
}
