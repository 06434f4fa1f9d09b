//! Unified error type.

use crate::config::ConfigError;
use crate::store::StoreError;

/// The error type returned by gazette's fallible startup operations.
///
/// Application-level errors (400, 404, 500) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// the failures that stop the process from serving traffic at all: bad
/// configuration, an unreachable store, or a socket that will not bind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
