//! # CLI Configuration
//!
//! Optional TOML file supplying store settings and namespace bindings:
//!
//! ```toml
//! [store]
//! kind = "json"
//! location = "people.json"
//!
//! [namespaces]
//! ex = "https://example.com/"
//! schema = "https://schema.org/"
//! ```
//!
//! Command-line flags override `[store]`. Namespace bindings last for one
//! command run; they are never written to the database.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tinytriple_core::{StoreConfig, StoreError};

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Bindings every store starts with.
pub const DEFAULT_NAMESPACES: [(&str, &str); 4] = [
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("schema", "https://schema.org/"),
];

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
}

impl AppConfig {
    /// Parse configuration text.
    ///
    /// Any value of the wrong shape (for example a numeric `location`) is
    /// reported as `InvalidConfiguration`.
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        toml::from_str(text).map_err(|e| StoreError::InvalidConfiguration(e.to_string()))
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            StoreError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(StoreError::InvalidConfiguration(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&text)
    }
}
