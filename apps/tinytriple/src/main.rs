//! # tinytriple
//!
//! Command-line front end for the tinytriple JSON-file triple store.
//!
//! ## Usage
//!
//! ```bash
//! tinytriple init
//! tinytriple add '<https://example.com/alice>' schema:name '"Alice"'
//! tinytriple import -f people.nt
//! tinytriple query '*' rdf:type schema:Person --compact
//! tinytriple export -o dump.nt
//! ```
//!
//! ## Logging
//!
//! Logs go to stderr. `TINYTRIPLE_LOG` (or `RUST_LOG`) sets the filter;
//! `TINYTRIPLE_LOG_FORMAT=json` switches to machine-parseable output.

use clap::Parser;
use tinytriple::cli;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose {
        "tinytriple=debug,tinytriple_core=debug"
    } else {
        "tinytriple=info,tinytriple_core=info"
    };
    let filter = EnvFilter::try_from_env("TINYTRIPLE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| default_filter.into());

    let log_format =
        std::env::var("TINYTRIPLE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
