//! # Term Codec
//!
//! Converts typed RDF terms to and from the JSON fragment stored in every
//! index record.
//!
//! ```text
//! Uri("https://example.com/a")   -> {"type":"uri","value":"https://example.com/a"}
//! Blank("n0")                    -> {"type":"blank","value":"n0"}
//! "bonjour"@fr                   -> {"type":"literal","value":"bonjour","datatype":"","language":"fr"}
//! ```
//!
//! Literals always carry both `datatype` and `language`; the empty string
//! means absent. Decoding is the exact inverse of encoding under `Term`
//! equality, which treats an empty datatype or language as absent.

use crate::primitives::{BLANK_TAG, LITERAL_TAG, URI_TAG};
use crate::{StoreError, Term};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serialized form of a `Term`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDocument {
    /// One of `uri`, `blank`, `literal`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Encode a term into its document form.
#[must_use]
pub fn encode(term: &Term) -> TermDocument {
    match term {
        Term::Uri(value) => TermDocument {
            kind: URI_TAG.to_string(),
            value: value.clone(),
            datatype: None,
            language: None,
        },
        Term::Blank(value) => TermDocument {
            kind: BLANK_TAG.to_string(),
            value: value.clone(),
            datatype: None,
            language: None,
        },
        Term::Literal {
            value,
            datatype,
            language,
        } => TermDocument {
            kind: LITERAL_TAG.to_string(),
            value: value.clone(),
            datatype: Some(datatype.clone().unwrap_or_default()),
            language: Some(language.clone().unwrap_or_default()),
        },
    }
}

/// Decode a document back into a term.
///
/// Empty or missing `datatype`/`language` decode as absent.
pub fn decode(document: &TermDocument) -> Result<Term, StoreError> {
    match document.kind.as_str() {
        URI_TAG => Ok(Term::Uri(document.value.clone())),
        BLANK_TAG => Ok(Term::Blank(document.value.clone())),
        LITERAL_TAG => Ok(Term::Literal {
            value: document.value.clone(),
            datatype: present(document.datatype.as_deref()),
            language: present(document.language.as_deref()),
        }),
        other => Err(StoreError::UnknownTermType(other.to_string())),
    }
}

fn present(field: Option<&str>) -> Option<String> {
    field.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Encode a term straight to a JSON value for embedding in a record.
pub fn encode_value(term: &Term) -> Result<Value, StoreError> {
    serde_json::to_value(encode(term)).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a term from a JSON value taken out of a record.
pub fn decode_value(value: &Value) -> Result<Term, StoreError> {
    let document = TermDocument::deserialize(value)
        .map_err(|e| StoreError::Deserialization(format!("Malformed term document: {}", e)))?;
    decode(&document)
}

// =============================================================================
// TESTS
// =============================================================================
