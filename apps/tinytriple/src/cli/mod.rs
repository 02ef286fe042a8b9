//! # tinytriple CLI Module
//!
//! This module implements the CLI interface for tinytriple.
//!
//! ## Available Commands
//!
//! - `init` - Create an empty database file
//! - `status` - Show store status
//! - `add` - Add one statement
//! - `import` - Add statements from an N-Triples file
//! - `query` - List statements matching a pattern
//! - `count` - Count stored statements
//! - `export` - Write all statements as N-Triples
//! - `namespaces` - List prefix bindings

mod commands;

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tinytriple_core::{StoreError, StoreKind};

/// Database file used when neither a flag nor the config file names one.
pub const DEFAULT_DATABASE: &str = "tinytriple.json";

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tinytriple - JSON-file triple store
///
/// Stores RDF statements in a JSON document file and answers
/// subject/predicate/object patterns.
#[derive(Parser, Debug)]
#[command(name = "tinytriple")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by TINYTRIPLE_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database file [default: tinytriple.json]
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "json" (database file) or "memory" (nothing persisted) [default: json]
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<StoreKind>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty database file
    Init {
        /// Replace an existing database file
        #[arg(short, long)]
        force: bool,
    },

    /// Show store status
    Status,

    /// Add one statement; terms in N-Triples syntax or prefix:local form
    Add {
        subject: String,
        predicate: String,
        object: String,
    },

    /// Add statements from an N-Triples file
    Import {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List statements matching a pattern ("*" is a wildcard)
    Query {
        #[arg(default_value = "*")]
        subject: String,
        #[arg(default_value = "*")]
        predicate: String,
        #[arg(default_value = "*")]
        object: String,

        /// Maximum number of statements to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Abbreviate URIs with bound prefixes
        #[arg(long)]
        compact: bool,
    },

    /// Count stored statements
    Count,

    /// Write all statements as N-Triples
    Export {
        /// Output file path ("-" for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// List prefix bindings
    Namespaces,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Settings shared by every command, resolved from flags and config file.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub backend: StoreKind,
    pub json_mode: bool,
    pub quiet: bool,
    pub config: AppConfig,
}

impl Context {
    /// Resolve flags against an optional configuration file.
    ///
    /// A flag given on the command line always wins; `[store]` values from
    /// the file fill in flags that were not given.
    pub fn from_cli(cli: &Cli) -> Result<Self, StoreError> {
        let config = match &cli.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        let backend = cli
            .backend
            .or_else(|| config.store.as_ref().map(|store| store.kind))
            .unwrap_or_default();
        let database = cli
            .database
            .clone()
            .or_else(|| config.store.as_ref().and_then(|store| store.location.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));

        Ok(Self {
            database,
            backend,
            json_mode: cli.json_mode,
            quiet: cli.quiet,
            config,
        })
    }
}

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), StoreError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&ctx, force).map(|_| ()),
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Add {
            subject,
            predicate,
            object,
        }) => cmd_add(&ctx, &subject, &predicate, &object),
        Some(Commands::Import { file }) => cmd_import(&ctx, &file),
        Some(Commands::Query {
            subject,
            predicate,
            object,
            limit,
            compact,
        }) => cmd_query(
            &ctx,
            [subject.as_str(), predicate.as_str(), object.as_str()],
            limit,
            compact,
        ),
        Some(Commands::Count) => cmd_count(&ctx),
        Some(Commands::Export { output }) => cmd_export(&ctx, &output),
        Some(Commands::Namespaces) => cmd_namespaces(&ctx),
    }
}
