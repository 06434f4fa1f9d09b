//! The article routes.
//!
//! Every handler has the same shape: decode inputs, make exactly one store
//! call, encode the result. Failures translate straight to a status code —
//! nothing is retried, nothing is recovered.
//!
//! The store reaches handlers by explicit injection: [`routes`] captures the
//! `Arc<dyn ArticleStore>` in a closure per route. Swapping the backend (or
//! substituting a test double) means calling `routes` with a different
//! store; no handler changes.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::handler::Handler;
use crate::health;
use crate::id::ArticleId;
use crate::method::Method;
use crate::model::{ArticleDraft, ArticleUpdate};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::store::{ArticleStore, StoreError};

/// Builds the application router over `store`.
pub fn routes(store: Arc<dyn ArticleStore>) -> Router {
    Router::new()
        .on(Method::Get,    "/",             home)
        .on(Method::Get,    "/articles",     with_store(&store, list_articles))
        .on(Method::Post,   "/article",      with_store(&store, create_article))
        .on(Method::Get,    "/article/{id}", with_store(&store, get_article))
        .on(Method::Put,    "/article/{id}", with_store(&store, update_article))
        .on(Method::Delete, "/article/{id}", with_store(&store, delete_article))
        .on(Method::Get,    "/healthz",      health::liveness)
        .on(Method::Get,    "/readyz",       health::readiness)
}

/// Adapts a two-argument handler into the router's `Fn(Request)` shape by
/// capturing a clone of the store.
fn with_store<F, Fut>(store: &Arc<dyn ArticleStore>, handler: F) -> impl Handler
where
    F: Fn(Arc<dyn ArticleStore>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let store = Arc::clone(store);
    move |req: Request| handler(Arc::clone(&store), req)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /`
async fn home(_req: Request) -> Response {
    debug!("GET /");
    Response::text("Welcome to the HomePage!")
}

/// `GET /articles` — every article, in the store's natural order.
async fn list_articles(store: Arc<dyn ArticleStore>, _req: Request) -> Response {
    debug!("GET /articles");
    match store.list().await {
        Ok(articles) => json(&articles),
        Err(err) => store_failure(err),
    }
}

/// `POST /article` — decode a draft, insert it, return the record with its
/// generated id. A body that does not decode as a draft is a 400, not a
/// silently zero-valued article.
async fn create_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    debug!("POST /article");
    let draft: ArticleDraft = match req.json() {
        Ok(draft) => draft,
        Err(err) => {
            return Response::builder()
                .status(Status::BadRequest)
                .text(format!("Invalid article payload: {err}"));
        }
    };

    match store.insert(draft).await {
        Ok(article) => json(&article),
        Err(err) => store_failure(err),
    }
}

/// `GET /article/{id}`
async fn get_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    debug!("GET /article/{{id}}");
    let id = match parse_id(&req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.find(id).await {
        Ok(article) => json(&article),
        Err(err) => store_failure(err),
    }
}

/// `PUT /article/{id}` — on success the response echoes the submitted
/// payload, not the stored record.
async fn update_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    debug!("PUT /article/{{id}}");
    let id = match parse_id(&req) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let update: ArticleUpdate = match req.json() {
        Ok(update) => update,
        Err(err) => {
            return Response::builder()
                .status(Status::BadRequest)
                .text(format!("Invalid update payload: {err}"));
        }
    };

    match store.update(id, update.clone()).await {
        Ok(()) => json(&update),
        Err(err) => store_failure(err),
    }
}

/// `DELETE /article/{id}`
async fn delete_article(store: Arc<dyn ArticleStore>, req: Request) -> Response {
    debug!("DELETE /article/{{id}}");
    let id = match parse_id(&req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match store.delete(id).await {
        Ok(()) => Response::text(format!("Article with ID {id} deleted")),
        Err(err) => store_failure(err),
    }
}

// ── Shared pieces ─────────────────────────────────────────────────────────────

/// The `{id}` path parameter as a typed id, or the 400 answering a malformed
/// one. A malformed id is never a 404: it could not name any record.
fn parse_id(req: &Request) -> Result<ArticleId, Response> {
    req.param("id").unwrap_or_default().parse().map_err(|_| {
        Response::builder()
            .status(Status::BadRequest)
            .text("Malformed article id (expected 24 hex characters)")
    })
}

fn json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => Response::json(bytes),
        Err(err) => {
            error!("response encoding failed: {err}");
            Response::status(Status::InternalServerError)
        }
    }
}

fn store_failure(err: StoreError) -> Response {
    match err {
        StoreError::NotFound(id) => Response::builder()
            .status(Status::NotFound)
            .text(format!("No article with ID {id}")),
        other => {
            error!("store operation failed: {other}");
            Response::status(Status::InternalServerError)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;
    use crate::model::Article;
    use crate::store::MemoryStore;

    fn store() -> Arc<dyn ArticleStore> {
        Arc::new(MemoryStore::new())
    }

    fn request(method: Method, body: &str, id: Option<&str>) -> Request {
        let mut params = HashMap::new();
        if let Some(id) = id {
            params.insert("id".to_owned(), id.to_owned());
        }
        Request::new(
            method,
            "/article".to_owned(),
            vec![("content-type".to_owned(), "application/json".to_owned())],
            Bytes::copy_from_slice(body.as_bytes()),
            params,
        )
    }

    fn body_str(res: &Response) -> &str {
        std::str::from_utf8(&res.body).unwrap()
    }

    #[tokio::test]
    async fn home_serves_the_welcome_message() {
        let res = home(request(Method::Get, "", None)).await;
        assert_eq!(res.status, 200);
        assert_eq!(body_str(&res), "Welcome to the HomePage!");
    }

    #[tokio::test]
    async fn create_read_delete_cycle() {
        let store = store();

        // POST /article
        let res = create_article(
            Arc::clone(&store),
            request(Method::Post, r#"{"name":"Hello","content":"Article Content"}"#, None),
        )
        .await;
        assert_eq!(res.status, 200);
        let created: Article = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(created.name, "Hello");
        assert_eq!(created.content, "Article Content");
        let id = created.id.to_string();

        // GET /article/{id} returns the same record
        let res = get_article(Arc::clone(&store), request(Method::Get, "", Some(&id))).await;
        assert_eq!(res.status, 200);
        let fetched: Article = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(fetched, created);

        // DELETE /article/{id}
        let res = delete_article(Arc::clone(&store), request(Method::Delete, "", Some(&id))).await;
        assert_eq!(res.status, 200);
        assert_eq!(body_str(&res), format!("Article with ID {id} deleted"));

        // GET again → 404
        let res = get_article(store, request(Method::Get, "", Some(&id))).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request_never_not_found() {
        let store = store();

        for bad in ["42", "not-hex", "0123456789abcdef0123456"] {
            let res = get_article(Arc::clone(&store), request(Method::Get, "", Some(bad))).await;
            assert_eq!(res.status, 400, "id {bad:?} should be rejected as malformed");
        }
    }

    #[tokio::test]
    async fn well_formed_unknown_id_is_not_found() {
        let store = store();
        let res = get_article(store, request(Method::Get, "", Some("0123456789abcdef01234567"))).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn malformed_create_body_is_bad_request() {
        let store = store();

        for bad in ["", "not json", r#"{"name":"x"}"#, r#"{"name":1,"content":"y"}"#] {
            let res =
                create_article(Arc::clone(&store), request(Method::Post, bad, None)).await;
            assert_eq!(res.status, 400, "body {bad:?} should be rejected");
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_echoes_the_payload_and_persists_it() {
        let store = store();
        let created = store
            .insert(ArticleDraft {
                name: "Hello".to_owned(),
                content: "Article Content".to_owned(),
                description: None,
            })
            .await
            .unwrap();
        let id = created.id.to_string();

        let payload = r#"{"name":"Hello 2","content":"New Content"}"#;
        let res =
            update_article(Arc::clone(&store), request(Method::Put, payload, Some(&id))).await;
        assert_eq!(res.status, 200);
        // Echo of the submitted fields, not the stored record — no id.
        let echo: ArticleUpdate = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(echo.name, "Hello 2");
        assert_eq!(echo.content, "New Content");

        let stored = store.find(created.id).await.unwrap();
        assert_eq!(stored.id, created.id);
        assert_eq!(stored.name, "Hello 2");
        assert_eq!(stored.content, "New Content");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_ids_are_not_found() {
        let store = store();
        let id = "0123456789abcdef01234567";
        let payload = r#"{"name":"x","content":"y"}"#;

        let res = update_article(Arc::clone(&store), request(Method::Put, payload, Some(id))).await;
        assert_eq!(res.status, 404);

        let res = delete_article(store, request(Method::Delete, "", Some(id))).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn listing_tracks_creates_and_deletes() {
        let store = store();

        let mut ids = Vec::new();
        for n in 0..4 {
            let res = create_article(
                Arc::clone(&store),
                request(Method::Post, &format!(r#"{{"name":"a{n}","content":"c"}}"#), None),
            )
            .await;
            let created: Article = serde_json::from_slice(&res.body).unwrap();
            ids.push(created.id.to_string());
        }
        delete_article(Arc::clone(&store), request(Method::Delete, "", Some(&ids[0]))).await;

        let res = list_articles(store, request(Method::Get, "", None)).await;
        assert_eq!(res.status, 200);
        let listed: Vec<Article> = serde_json::from_slice(&res.body).unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn routes_wires_every_path() {
        let router = routes(store());

        for (method, path) in [
            (Method::Get, "/"),
            (Method::Get, "/articles"),
            (Method::Post, "/article"),
            (Method::Get, "/article/0123456789abcdef01234567"),
            (Method::Put, "/article/0123456789abcdef01234567"),
            (Method::Delete, "/article/0123456789abcdef01234567"),
            (Method::Get, "/healthz"),
            (Method::Get, "/readyz"),
        ] {
            assert!(
                router.lookup(method, path).is_some(),
                "missing route {method} {path}"
            );
        }
    }
}
