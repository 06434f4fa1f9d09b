//! The storage capability and its two implementations.
//!
//! Handlers talk to an [`ArticleStore`] trait object and never know which
//! backend is behind it. [`MemoryStore`] keeps articles in a process-local
//! map; [`DocumentStore`] persists them as JSON documents. The backend is
//! chosen exactly once, at startup, by [`connect`].

mod document;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::id::ArticleId;
use crate::model::{Article, ArticleDraft, ArticleUpdate};

pub use document::DocumentStore;
pub use memory::MemoryStore;

/// A storage operation failure.
///
/// `NotFound` is the only variant handlers map to anything other than an
/// internal error; everything else surfaces directly, untouched — no retries,
/// no backoff.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no article with id {0}")]
    NotFound(ArticleId),

    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("stored document is not a valid article: {0}")]
    Codec(#[from] serde_json::Error),
}

/// The storage capability: find-all, find-one, insert, update, delete.
///
/// Implementations generate identifiers on insert — callers never supply one
/// — and must be safe for concurrent use from many in-flight requests, since
/// one instance is shared across every connection task for the process
/// lifetime.
#[async_trait]
pub trait ArticleStore: Send + Sync + 'static {
    /// All articles, in the backend's natural iteration order. No sort.
    async fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// The article with `id`, or [`StoreError::NotFound`].
    async fn find(&self, id: ArticleId) -> Result<Article, StoreError>;

    /// Persists `draft` under a freshly generated id and returns the full
    /// record.
    async fn insert(&self, draft: ArticleDraft) -> Result<Article, StoreError>;

    /// Replaces `name` and `content` of the article with `id`.
    /// [`StoreError::NotFound`] when no article matched.
    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<(), StoreError>;

    /// Removes the article with `id`. [`StoreError::NotFound`] when no
    /// article matched.
    async fn delete(&self, id: ArticleId) -> Result<(), StoreError>;
}

/// Connects the backend named by `config`.
///
/// Called once at startup. Failure here is fatal: a service without its store
/// cannot serve traffic, so `main` logs the error and exits.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn ArticleStore>, StoreError> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Document { uri, database } => {
            Ok(Arc::new(DocumentStore::open(uri, database)?))
        }
    }
}
