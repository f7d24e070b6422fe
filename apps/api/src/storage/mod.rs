//! Persistence for the prompt document.
//!
//! Both backends read and write the same thing: one JSON array holding every
//! record, replaced as a whole on each save. `CatalogService` only ever sees
//! the `PromptStore` trait, chosen at startup from config.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PromptRecord;

#[cfg(test)]
pub(crate) mod fake_github;
pub mod github;
pub mod local;

pub use github::{GitHubStore, GitHubStoreConfig};
pub use local::LocalFileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed prompt document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store rejected credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("remote store error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not decode remote content: {0}")]
    Decode(String),

    #[error("storage task failed: {0}")]
    Task(String),
}

/// What a `load` found at the store's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    Records(Vec<PromptRecord>),
    /// No document at the configured location. Not an error: the store stays
    /// writable and the first save creates it. Callers should still tell the
    /// operator, since a mistyped location looks exactly like this.
    Missing,
}

impl Loaded {
    pub fn into_records(self) -> Vec<PromptRecord> {
        match self {
            Loaded::Records(records) => records,
            Loaded::Missing => Vec::new(),
        }
    }
}

#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Reads the full record set.
    async fn load(&self) -> Result<Loaded, StoreError>;

    /// Replaces the stored document with `records`, in order.
    async fn save(&self, records: &[PromptRecord]) -> Result<(), StoreError>;

    /// Human-readable location, for logs and the status endpoint.
    fn describe(&self) -> String;
}

/// Serializes records as the persisted document: 2-space indented UTF-8 JSON,
/// non-ASCII left unescaped, order preserved.
pub fn encode_document(records: &[PromptRecord]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn decode_document(raw: &str) -> Result<Vec<PromptRecord>, StoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}
