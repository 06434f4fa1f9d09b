//! # gazette
//!
//! A small JSON articles service. Five CRUD routes, one entity, two
//! interchangeable stores. Nothing more. Nothing less.
//!
//! ## The shape
//!
//! Every handler does the same three things: decode inputs, make exactly one
//! store call, encode the result. The store behind those calls is picked once
//! at startup — an in-memory map for development and tests, or a persistent
//! document store for real data — and injected into the handlers as
//! `Arc<dyn ArticleStore>`. Handlers never touch a global.
//!
//! The HTTP layer underneath is deliberately minimal:
//!
//! - Radix-tree routing — O(path-length) lookup via [`matchit`]
//! - Async I/O — tokio + hyper, one task per connection
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```text
//! GAZETTE_STORE=memory cargo run
//!
//! curl -X POST localhost:8081/article \
//!      -H 'content-type: application/json' \
//!      -d '{"name":"Hello","content":"Article Content"}'
//! curl localhost:8081/articles
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod health;
pub mod id;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
