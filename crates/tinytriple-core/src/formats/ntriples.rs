//! # N-Triples Term Syntax
//!
//! Reads terms and single-line statements in N-Triples form. Writing is the
//! `Display` impl on `Term` and `Triple`.
//!
//! ```text
//! <https://example.com/a>                      URI
//! _:n0                                         blank node
//! "Alice"  "bonjour"@fr  "1"^^<...#integer>    literals
//! ```
//!
//! Variables (`?x`, `$x`) and quoted triples (`<< s p o >>`) are recognized
//! only to be rejected with `UnsupportedTermKind`.

use crate::{StoreError, Term, Triple};

/// Parse one term.
pub fn parse_term(input: &str) -> Result<Term, StoreError> {
    let input = input.trim();
    let (text, rest) = split_term(input)?;
    if !rest.trim().is_empty() {
        return Err(StoreError::Syntax(format!(
            "Unexpected text after term: '{}'",
            rest.trim()
        )));
    }
    term_from_token(text)
}

/// Parse a pattern position: `*` or `_` is a wildcard.
pub fn parse_pattern_term(input: &str) -> Result<Option<Term>, StoreError> {
    match input.trim() {
        "*" | "_" => Ok(None),
        other => parse_term(other).map(Some),
    }
}

/// Parse one statement line (`s p o .`).
///
/// Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Triple>, StoreError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut rest = line;
    let mut terms = Vec::with_capacity(3);
    for _ in 0..3 {
        let (text, tail) = split_term(rest.trim_start())?;
        terms.push(term_from_token(text)?);
        rest = tail;
    }

    let rest = rest.trim_start();
    let Some(after_dot) = rest.strip_prefix('.') else {
        return Err(StoreError::Syntax(format!(
            "Statement must end with '.': '{}'",
            line
        )));
    };
    let trailing = after_dot.trim();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err(StoreError::Syntax(format!(
            "Unexpected text after statement: '{}'",
            trailing
        )));
    }

    let mut terms = terms.into_iter();
    match (terms.next(), terms.next(), terms.next()) {
        (Some(s), Some(p), Some(o)) => Ok(Some(Triple::new(s, p, o))),
        _ => Err(StoreError::Syntax(format!("Incomplete statement: '{}'", line))),
    }
}

// =============================================================================
// TOKENIZING
// =============================================================================

/// Split the leading term token off `input`.
fn split_term(input: &str) -> Result<(&str, &str), StoreError> {
    if input.starts_with("<<") {
        return Err(StoreError::UnsupportedTermKind(
            "quoted triple".to_string(),
        ));
    }
    if input.starts_with('?') || input.starts_with('$') {
        return Err(StoreError::UnsupportedTermKind(format!(
            "variable '{}'",
            input.split_whitespace().next().unwrap_or(input)
        )));
    }

    let end = if input.starts_with('<') {
        input
            .find('>')
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::Syntax(format!("Unterminated IRI: '{}'", input)))?
    } else if input.starts_with("_:") {
        blank_label_end(input)
    } else if input.starts_with('"') {
        literal_end(input)?
    } else if input.is_empty() {
        return Err(StoreError::Syntax("Expected a term".to_string()));
    } else {
        return Err(StoreError::Syntax(format!("Unrecognized term: '{}'", input)));
    };

    Ok(input.split_at(end))
}

/// Byte offset just past a blank node token. A label never ends with
/// `.`, so a dot followed by whitespace or end of input terminates it.
fn blank_label_end(input: &str) -> usize {
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            return i;
        }
        if c == '.' && chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
            return i;
        }
    }
    input.len()
}

/// Byte offset just past a literal token, including any `@lang` or
/// `^^<datatype>` suffix.
fn literal_end(input: &str) -> Result<usize, StoreError> {
    let mut escaped = false;
    let mut close = None;
    for (i, c) in input.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                close = Some(i);
                break;
            }
            _ => {}
        }
    }
    let close = close
        .ok_or_else(|| StoreError::Syntax(format!("Unterminated string: '{}'", input)))?;

    let after = &input[close + 1..];
    let suffix_len = if after.starts_with('@') {
        1 + after[1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(after.len() - 1)
    } else if let Some(dt) = after.strip_prefix("^^") {
        if !dt.starts_with('<') {
            return Err(StoreError::Syntax(format!(
                "Datatype must be an IRI: '{}'",
                input
            )));
        }
        2 + dt
            .find('>')
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::Syntax(format!("Unterminated datatype: '{}'", input)))?
    } else {
        0
    };

    Ok(close + 1 + suffix_len)
}

fn term_from_token(token: &str) -> Result<Term, StoreError> {
    if let Some(iri) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(Term::uri(check_iri(iri)?));
    }
    if let Some(label) = token.strip_prefix("_:") {
        if label.is_empty() {
            return Err(StoreError::Syntax("Empty blank node label".to_string()));
        }
        return Ok(Term::blank(label));
    }
    if token.starts_with('"') {
        return parse_literal(token);
    }
    Err(StoreError::Syntax(format!("Unrecognized term: '{}'", token)))
}

fn check_iri(iri: &str) -> Result<&str, StoreError> {
    if iri.is_empty() {
        return Err(StoreError::Syntax("Empty IRI".to_string()));
    }
    if let Some(bad) = iri
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '`'))
    {
        return Err(StoreError::Syntax(format!(
            "Invalid character {:?} in IRI '{}'",
            bad, iri
        )));
    }
    Ok(iri)
}

fn parse_literal(token: &str) -> Result<Term, StoreError> {
    let close = token
        .rfind('"')
        .filter(|i| *i > 0)
        .ok_or_else(|| StoreError::Syntax(format!("Unterminated string: '{}'", token)))?;
    let value = unescape(&token[1..close])?;
    let suffix = &token[close + 1..];

    if suffix.is_empty() {
        Ok(Term::literal(value))
    } else if let Some(lang) = suffix.strip_prefix('@') {
        if lang.is_empty() {
            return Err(StoreError::Syntax("Empty language tag".to_string()));
        }
        Ok(Term::lang_literal(value, lang))
    } else if let Some(dt) = suffix
        .strip_prefix("^^<")
        .and_then(|d| d.strip_suffix('>'))
    {
        Ok(Term::typed_literal(value, check_iri(dt)?))
    } else {
        Err(StoreError::Syntax(format!(
            "Invalid literal suffix '{}'",
            suffix
        )))
    }
}

fn unescape(raw: &str) -> Result<String, StoreError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some('u') => out.push(hex_char(&mut chars, 4)?),
            Some('U') => out.push(hex_char(&mut chars, 8)?),
            Some(other) => {
                return Err(StoreError::Syntax(format!(
                    "Unknown escape '\\{}'",
                    other
                )));
            }
            None => return Err(StoreError::Syntax("Dangling escape".to_string())),
        }
    }
    Ok(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, StoreError> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return Err(StoreError::Syntax(format!("Short unicode escape '{}'", hex)));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| StoreError::Syntax(format!("Invalid unicode escape '{}'", hex)))
}

// =============================================================================
// TESTS
// =============================================================================
