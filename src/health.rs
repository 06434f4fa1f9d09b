//! Health-check handlers.
//!
//! Two probes, two questions:
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from load-balancer. |
//!
//! Both are registered by [`api::routes`](crate::api::routes).

use crate::{Request, Response};

/// Liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe handler.
///
/// Returns `200 OK` with body `"ready"`. The store is connected before the
/// listener starts accepting, so a process that answers at all is ready.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
