//! HTTP server and graceful shutdown.
//!
//! When the orchestrator terminates the process it sends **SIGTERM** and
//! waits a grace period before SIGKILL. The server reacts by:
//!
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across concurrent connection tasks without copying the
        // routing table.
        let router = Arc::new(router);

        info!(addr = %self.addr, "gazette listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // The closure runs once per request on the
                        // connection, not once per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req).await }
                        });

                        // `auto::Builder` handles both HTTP/1.1 and HTTP/2,
                        // whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("gazette stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Core hot path: routes one request and produces one response.
///
/// The error type is [`Infallible`](std::convert::Infallible) — all failures
/// are answered internally (405 for an unknown method, 404 for a route miss,
/// 400 for a body that cannot be read) so hyper never sees an error.
///
/// Generic over the body type: the server feeds it `hyper::body::Incoming`,
/// tests feed it in-memory bodies.
async fn dispatch<B>(
    router: Arc<Router>,
    req: http::Request<B>,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        return Ok(Response::status(Status::MethodNotAllowed).into_inner());
    };
    let path = req.uri().path().to_owned();

    let Some((handler, params)) = router.lookup(method, &path) else {
        return Ok(Response::status(Status::NotFound).into_inner());
    };

    let (parts, body) = req.into_parts();

    // Header values that are not valid UTF-8 are dropped rather than lossily
    // transcoded; nothing in this service reads binary header values.
    let headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
        .collect();

    // Collect the body up front; handlers work on plain bytes.
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("failed to read request body: {e}");
            return Ok(Response::status(Status::BadRequest).into_inner());
        }
    };

    let request = Request::new(method, path, headers, body, params);
    Ok(handler.call(request).await.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by orchestrators) and
/// **SIGINT** (Ctrl-C, for local dev). On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use bytes::Bytes;
    use http_body_util::Full;

    use super::*;

    #[test]
    #[should_panic(expected = "invalid socket address")]
    fn bind_rejects_garbage_addresses() {
        Server::bind("not-an-address");
    }

    async fn listed(_req: Request) -> Response {
        Response::text("listed")
    }

    async fn created(req: Request) -> Response {
        Response::text(format!("got {} bytes", req.body().len()))
    }

    fn router() -> Arc<Router> {
        Arc::new(
            Router::new()
                .on(Method::Get, "/articles", listed)
                .on(Method::Post, "/article", created),
        )
    }

    fn request(method: &str, path: &str) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .expect("valid test request")
    }

    /// A body whose first frame is an error, standing in for a connection
    /// that dies mid-upload.
    struct BrokenBody;

    impl hyper::body::Body for BrokenBody {
        type Data = Bytes;
        type Error = String;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<hyper::body::Frame<Bytes>, Self::Error>>> {
            Poll::Ready(Some(Err("connection reset".to_owned())))
        }
    }

    #[tokio::test]
    async fn unknown_method_is_405() {
        let res = dispatch(router(), request("PROPFIND", "/articles")).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unrouted_path_is_404() {
        let res = dispatch(router(), request("GET", "/nope")).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn known_path_with_wrong_method_is_404() {
        let res = dispatch(router(), request("DELETE", "/articles")).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unreadable_body_is_400() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/article")
            .body(BrokenBody)
            .expect("valid test request");

        let res = dispatch(router(), req).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn routed_request_reaches_the_handler() {
        let res = dispatch(router(), request("GET", "/articles")).await.unwrap();
        assert_eq!(res.status(), http::StatusCode::OK);
    }
}
