//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Every command opens the store, does its work, and closes it again.

use super::Context;
use crate::config::DEFAULT_NAMESPACES;
use std::io::{BufWriter, Write};
use std::path::Path;
use tinytriple_core::{
    OpenStatus, Store, StoreError, StoreKind, Term, Triple, TriplePattern, TripleStore,
    parse_line, parse_term,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for import (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_IMPORT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), StoreError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StoreError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(StoreError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to a regular file.
fn validate_file_path(path: &Path) -> Result<std::path::PathBuf, StoreError> {
    let canonical = path.canonicalize().map_err(|e| {
        StoreError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(StoreError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// STORE HELPERS
// =============================================================================

/// Open the store named by the context and bind the default and
/// configured namespaces.
pub fn open_store(ctx: &Context) -> Result<(TripleStore, OpenStatus), StoreError> {
    let kind = ctx.backend;
    let location = ctx.database.to_str().ok_or_else(|| {
        StoreError::InvalidConfiguration(format!(
            "Database path '{}' is not valid UTF-8",
            ctx.database.display()
        ))
    })?;

    let mut store = TripleStore::new(kind);
    let status = store.open(Some(location))?;
    if kind == StoreKind::Ephemeral {
        tracing::warn!("memory backend: changes are discarded when the command exits");
    }

    for (prefix, namespace) in DEFAULT_NAMESPACES {
        store.bind(prefix, namespace);
    }
    for (prefix, namespace) in &ctx.config.namespaces {
        store.bind(prefix, namespace);
    }

    tracing::debug!(
        backend = %kind,
        database = %ctx.database.display(),
        ?status,
        "opened store"
    );
    Ok((store, status))
}

/// Parse a term, expanding `prefix:local` through the store's bindings.
pub fn resolve_term(store: &TripleStore, token: &str) -> Result<Term, StoreError> {
    let token = token.trim();
    let ntriples_syntax = token.starts_with('<') || token.starts_with('"') || token.starts_with("_:");
    if !ntriples_syntax {
        if let Some((prefix, local)) = token.split_once(':') {
            if let Some(namespace) = store.namespace(prefix) {
                return Ok(Term::uri(format!("{}{}", namespace, local)));
            }
        }
    }
    parse_term(token)
}

/// Like `resolve_term`, with `*` and `_` as wildcards.
pub fn resolve_pattern_term(store: &TripleStore, token: &str) -> Result<Option<Term>, StoreError> {
    match token.trim() {
        "*" | "_" => Ok(None),
        other => resolve_term(store, other).map(Some),
    }
}

/// Render a term, abbreviating URIs under the longest bound namespace.
pub fn compact_term(store: &TripleStore, term: &Term) -> String {
    if let Term::Uri(uri) = term {
        let best = store
            .namespaces()
            .filter(|(_, ns)| uri.len() > ns.len() && uri.starts_with(ns))
            .max_by_key(|(_, ns)| ns.len());
        if let Some((prefix, ns)) = best {
            return format!("{}:{}", prefix, &uri[ns.len()..]);
        }
    }
    term.to_string()
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create a database file holding the three empty tables.
///
/// Returns the status reported when the store was opened, which is
/// `Created` for every successful durable init.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<OpenStatus, StoreError> {
    let kind = ctx.backend;
    if kind == StoreKind::Durable && ctx.database.exists() {
        if !force {
            return Err(StoreError::Io(format!(
                "Database '{}' already exists (use --force to replace it)",
                ctx.database.display()
            )));
        }
        std::fs::remove_file(&ctx.database).map_err(|e| {
            StoreError::Io(format!("Cannot remove '{}': {}", ctx.database.display(), e))
        })?;
    }

    let (mut store, status) = open_store(ctx)?;
    store.close();

    if !ctx.quiet {
        println!(
            "Initialized {} store at {:?} ({:?})",
            kind, ctx.database, status
        );
    }
    Ok(status)
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(ctx: &Context) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let triples = store.count()?;
    let namespaces = store.namespaces().len();
    let caps = store.capabilities();
    store.close();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "database": ctx.database.to_string_lossy(),
            "backend": ctx.backend.to_string(),
            "triples": triples,
            "namespaces": namespaces,
            "context_aware": caps.context_aware,
            "formula_aware": caps.formula_aware,
            "transaction_aware": caps.transaction_aware,
            "graph_aware": caps.graph_aware,
        }));
        return Ok(());
    }

    println!("tinytriple Store Status");
    println!("=======================");
    println!("Database:   {:?}", ctx.database);
    println!("Backend:    {}", ctx.backend);
    println!();
    println!("Triples:    {}", triples);
    println!("Namespaces: {}", namespaces);

    Ok(())
}

// =============================================================================
// ADD COMMAND
// =============================================================================

/// Add one statement.
pub fn cmd_add(
    ctx: &Context,
    subject: &str,
    predicate: &str,
    object: &str,
) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let triple = Triple::new(
        resolve_term(&store, subject)?,
        resolve_term(&store, predicate)?,
        resolve_term(&store, object)?,
    );
    let inserted = store.add(&triple)?;
    let total = store.count()?;
    store.close();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "statement": triple.to_string(),
            "inserted": inserted,
            "triples": total,
        }));
    } else if !ctx.quiet {
        if inserted {
            println!("Added: {}", triple);
        } else {
            println!("Already present: {}", triple);
        }
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Add every statement of an N-Triples file.
pub fn cmd_import(ctx: &Context, file: &Path) -> Result<(), StoreError> {
    tracing::info!("Importing from {:?}", file);

    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;
    let contents = std::fs::read_to_string(&validated_path)
        .map_err(|e| StoreError::Io(format!("Read file: {}", e)))?;

    let (mut store, _) = open_store(ctx)?;
    let (added, duplicates) = import_statements(&mut store, &contents)?;
    let total = store.count()?;
    store.close();

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "added": added,
            "duplicates": duplicates,
            "triples": total,
        }));
    } else if !ctx.quiet {
        println!("Imported {} statements ({} already present)", added, duplicates);
        println!("Store now has {} triples", total);
    }
    Ok(())
}

/// Add each statement line of `contents`; returns (added, duplicates).
///
/// Syntax errors carry their 1-based line number. Statements before a
/// failing line stay stored.
pub fn import_statements(
    store: &mut TripleStore,
    contents: &str,
) -> Result<(usize, usize), StoreError> {
    let mut added = 0;
    let mut duplicates = 0;
    for (number, line) in contents.lines().enumerate() {
        let parsed = parse_line(line).map_err(|e| match e {
            StoreError::Syntax(msg) => StoreError::Syntax(format!("line {}: {}", number + 1, msg)),
            StoreError::UnsupportedTermKind(kind) => {
                StoreError::UnsupportedTermKind(format!("line {}: {}", number + 1, kind))
            }
            other => other,
        })?;
        if let Some(triple) = parsed {
            if store.add(&triple)? {
                added += 1;
            } else {
                duplicates += 1;
            }
        }
    }
    Ok((added, duplicates))
}

// =============================================================================
// QUERY COMMAND
// =============================================================================

/// List statements matching a pattern.
pub fn cmd_query(
    ctx: &Context,
    terms: [&str; 3],
    limit: Option<usize>,
    compact: bool,
) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let [subject, predicate, object] = terms;
    let pattern = TriplePattern::new(
        resolve_pattern_term(&store, subject)?,
        resolve_pattern_term(&store, predicate)?,
        resolve_pattern_term(&store, object)?,
    );
    tracing::debug!(shape = %pattern.shape(), "query");

    let render = |term: &Term| {
        if compact {
            compact_term(&store, term)
        } else {
            term.to_string()
        }
    };

    let mut rows = Vec::new();
    for result in store
        .triples(&pattern, ())?
        .take(limit.unwrap_or(usize::MAX))
    {
        let (triple, ()) = result?;
        rows.push([
            render(&triple.subject),
            render(&triple.predicate),
            render(&triple.object),
        ]);
    }
    store.close();

    if ctx.json_mode {
        let results: Vec<serde_json::Value> = rows
            .iter()
            .map(|[s, p, o]| serde_json::json!({"subject": s, "predicate": p, "object": o}))
            .collect();
        print_json(&serde_json::json!({
            "count": results.len(),
            "results": results,
        }));
        return Ok(());
    }

    for [s, p, o] in &rows {
        println!("{} {} {} .", s, p, o);
    }
    if !ctx.quiet {
        eprintln!("{} matching statements", rows.len());
    }
    Ok(())
}

// =============================================================================
// COUNT COMMAND
// =============================================================================

/// Print the number of stored statements.
pub fn cmd_count(ctx: &Context) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let count = store.count()?;
    store.close();

    if ctx.json_mode {
        print_json(&serde_json::json!({ "triples": count }));
    } else {
        println!("{}", count);
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write every stored statement as N-Triples.
pub fn cmd_export(ctx: &Context, output: &Path) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let triples = store.matching(&TriplePattern::any())?;
    store.close();

    if output == Path::new("-") {
        let stdout = std::io::stdout();
        write_ntriples(&mut stdout.lock(), &triples)?;
    } else {
        let file = std::fs::File::create(output)
            .map_err(|e| StoreError::Io(format!("Create '{}': {}", output.display(), e)))?;
        write_ntriples(&mut BufWriter::new(file), &triples)?;
        if !ctx.quiet {
            println!("Exported {} statements to {:?}", triples.len(), output);
        }
    }
    Ok(())
}

/// One statement per line.
pub fn write_ntriples<W: Write>(out: &mut W, triples: &[Triple]) -> Result<(), StoreError> {
    for triple in triples {
        writeln!(out, "{}", triple).map_err(|e| StoreError::Io(e.to_string()))?;
    }
    out.flush().map_err(|e| StoreError::Io(e.to_string()))
}

// =============================================================================
// NAMESPACES COMMAND
// =============================================================================

/// List prefix bindings in binding order.
pub fn cmd_namespaces(ctx: &Context) -> Result<(), StoreError> {
    let (mut store, _) = open_store(ctx)?;
    let bindings: Vec<(String, String)> = store
        .namespaces()
        .map(|(p, ns)| (p.to_string(), ns.to_string()))
        .collect();
    store.close();

    if ctx.json_mode {
        let map: serde_json::Map<String, serde_json::Value> = bindings
            .into_iter()
            .map(|(p, ns)| (p, serde_json::Value::String(ns)))
            .collect();
        print_json(&serde_json::Value::Object(map));
        return Ok(());
    }

    for (prefix, namespace) in &bindings {
        println!("{:<8} {}", prefix, namespace);
    }
    Ok(())
}
