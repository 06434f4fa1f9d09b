//! In-memory store.
//!
//! A HashMap behind an async RwLock. Reads run concurrently; writes take the
//! lock exclusively for the duration of one map operation. Nothing survives
//! the process. Primarily for development and handler tests, but it is a
//! complete implementation of the capability.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::id::ArticleId;
use crate::model::{Article, ArticleDraft, ArticleUpdate};
use crate::store::{ArticleStore, StoreError};

/// HashMap-backed [`ArticleStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: RwLock<HashMap<ArticleId, Article>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.articles.read().await.values().cloned().collect())
    }

    async fn find(&self, id: ArticleId) -> Result<Article, StoreError> {
        self.articles
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert(&self, draft: ArticleDraft) -> Result<Article, StoreError> {
        let article = draft.into_article(ArticleId::generate());
        self.articles.write().await.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<(), StoreError> {
        match self.articles.write().await.get_mut(&id) {
            Some(article) => {
                article.apply(update);
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: ArticleId) -> Result<(), StoreError> {
        match self.articles.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
