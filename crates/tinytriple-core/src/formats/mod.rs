//! # Text Formats
//!
//! Term and statement syntax for moving triples in and out of a store.

pub mod ntriples;

pub use ntriples::{parse_line, parse_pattern_term, parse_term};
