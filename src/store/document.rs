//! Persistent document store.
//!
//! Articles live as JSON documents in a single sqlite table, one table per
//! collection: `(id TEXT PRIMARY KEY, doc TEXT)`. The connection is opened
//! once at startup and reused by every request for the process lifetime —
//! no pooling, no reconnects. A tokio mutex serializes access; every
//! operation is a single short statement (update is a read-modify-write, but
//! both statements run under the one lock acquisition).
//!
//! The rusqlite calls are synchronous and run inline on the runtime worker
//! rather than through `spawn_blocking`: each is a single-row statement
//! against a local file, microseconds of work, and the mutex already caps
//! concurrency at one statement at a time. A backend with real network
//! latency would need the `spawn_blocking` hop.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;
use tracing::debug;

use crate::id::ArticleId;
use crate::model::{Article, ArticleDraft, ArticleUpdate};
use crate::store::{ArticleStore, StoreError};

/// Sqlite-backed [`ArticleStore`].
pub struct DocumentStore {
    conn: Mutex<Connection>,
    // Validated as an identifier at config time; interpolated into SQL
    // because table names cannot be bound as parameters.
    collection: String,
}

impl DocumentStore {
    /// Opens (or creates) the store at `uri` and ensures the collection
    /// table exists. The one fatal failure mode in the system: if this
    /// fails, the process has nothing to serve.
    pub fn open(uri: &str, collection: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(uri)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {collection} (
                    id  TEXT PRIMARY KEY,
                    doc TEXT NOT NULL
                )"
            ),
            [],
        )?;
        debug!(uri, collection, "document store opened");
        Ok(Self { conn: Mutex::new(conn), collection: collection.to_owned() })
    }

    fn decode(doc: &str) -> Result<Article, StoreError> {
        Ok(serde_json::from_str(doc)?)
    }

    fn encode(article: &Article) -> Result<String, StoreError> {
        Ok(serde_json::to_string(article)?)
    }
}

#[async_trait]
impl ArticleStore for DocumentStore {
    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("SELECT doc FROM {}", self.collection))?;
        let docs = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut articles = Vec::new();
        for doc in docs {
            articles.push(Self::decode(&doc?)?);
        }
        Ok(articles)
    }

    async fn find(&self, id: ArticleId) -> Result<Article, StoreError> {
        let conn = self.conn.lock().await;
        let doc: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM {} WHERE id = ?1", self.collection),
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match doc {
            Some(doc) => Self::decode(&doc),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn insert(&self, draft: ArticleDraft) -> Result<Article, StoreError> {
        let article = draft.into_article(ArticleId::generate());
        let doc = Self::encode(&article)?;

        let conn = self.conn.lock().await;
        conn.execute(
            &format!("INSERT INTO {} (id, doc) VALUES (?1, ?2)", self.collection),
            params![article.id.to_string(), doc],
        )?;
        Ok(article)
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let doc: Option<String> = conn
            .query_row(
                &format!("SELECT doc FROM {} WHERE id = ?1", self.collection),
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(doc) = doc else {
            return Err(StoreError::NotFound(id));
        };

        let mut article = Self::decode(&doc)?;
        article.apply(update);
        conn.execute(
            &format!("UPDATE {} SET doc = ?2 WHERE id = ?1", self.collection),
            params![id.to_string(), Self::encode(&article)?],
        )?;
        Ok(())
    }

    async fn delete(&self, id: ArticleId) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.collection),
            params![id.to_string()],
        )?;

        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ArticleDraft {
        ArticleDraft {
            name: name.to_owned(),
            content: "Article Content".to_owned(),
            description: Some("Article Description".to_owned()),
        }
    }

    fn open_in(dir: &tempfile::TempDir) -> DocumentStore {
        let path = dir.path().join("gazette.db");
        DocumentStore::open(path.to_str().unwrap(), "articles").unwrap()
    }

    #[tokio::test]
    async fn crud_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir);

        let created = store.insert(draft("Hello")).await.unwrap();
        assert_eq!(store.find(created.id).await.unwrap(), created);

        store
            .update(
                created.id,
                ArticleUpdate { name: "Hello 2".to_owned(), content: "changed".to_owned() },
            )
            .await
            .unwrap();
        let updated = store.find(created.id).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Hello 2");
        assert_eq!(updated.description, created.description);

        store.delete(created.id).await.unwrap();
        assert!(matches!(store.find(created.id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn zero_match_mutations_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir);
        let id: ArticleId = "0123456789abcdef01234567".parse().unwrap();
        let update = ArticleUpdate { name: "x".to_owned(), content: "y".to_owned() };

        assert!(matches!(store.update(id, update).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn documents_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let created = {
            let store = open_in(&dir);
            store.insert(draft("persisted")).await.unwrap()
        };

        let store = open_in(&dir);
        assert_eq!(store.find(created.id).await.unwrap(), created);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gazette.db");
        let path = path.to_str().unwrap();

        let store_a = DocumentStore::open(path, "articles").unwrap();
        store_a.insert(draft("only in a")).await.unwrap();
        drop(store_a);

        let store_b = DocumentStore::open(path, "drafts").unwrap();
        assert!(store_b.list().await.unwrap().is_empty());
    }
}
