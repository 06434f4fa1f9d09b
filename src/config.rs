//! Process configuration, read once from the environment at startup.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `GAZETTE_ADDR` | bind address | `0.0.0.0:8081` |
//! | `GAZETTE_STORE` | `document` or `memory` | `document` |
//! | `GAZETTE_STORE_URI` | document-store path | required for `document` |
//! | `GAZETTE_STORE_DB` | collection name | `articles` |
//!
//! A missing `GAZETTE_STORE_URI` while the document backend is selected is a
//! fatal startup error — the process cannot serve traffic without its store.

use std::env;
use std::fmt;

const ADDR: &str = "GAZETTE_ADDR";
const STORE: &str = "GAZETTE_STORE";
const STORE_URI: &str = "GAZETTE_STORE_URI";
const STORE_DB: &str = "GAZETTE_STORE_DB";

const DEFAULT_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_DB: &str = "articles";

/// Everything `main` needs to bring the service up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: String,
    pub store: StoreConfig,
}

/// Which storage backend to connect at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreConfig {
    /// Volatile in-process map. Data is gone when the process is.
    Memory,
    /// Persistent document store at `uri`, collection `database`.
    Document { uri: String, database: String },
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Document { uri, database } => write!(f, "document://{uri}#{database}"),
        }
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("GAZETTE_STORE_URI is not set (required for the document store)")]
    MissingUri,

    #[error("unknown store backend `{0}` (expected `document` or `memory`)")]
    UnknownBackend(String),

    #[error("invalid collection name `{0}` (letters, digits and underscores only)")]
    InvalidCollectionName(String),
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, so tests never have to mutate
    /// process-global environment variables.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup(ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_owned());

        let backend = lookup(STORE).unwrap_or_else(|| "document".to_owned());
        let store = match backend.as_str() {
            "memory" => StoreConfig::Memory,
            "document" => {
                let uri = lookup(STORE_URI).ok_or(ConfigError::MissingUri)?;
                let database = lookup(STORE_DB).unwrap_or_else(|| DEFAULT_DB.to_owned());
                // The collection name becomes a table name and cannot be
                // bound as a SQL parameter, so it is validated here instead.
                if !is_identifier(&database) {
                    return Err(ConfigError::InvalidCollectionName(database));
                }
                StoreConfig::Document { uri, database }
            }
            other => return Err(ConfigError::UnknownBackend(other.to_owned())),
        };

        Ok(Self { addr, store })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
