//! Unified error type.

use std::path::PathBuf;

use thiserror::Error;

use crate::handler::BoxError;
use crate::method::Method;

/// The error type returned by routekit's fallible operations.
///
/// Expected client-facing failures (401, 403, 404) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// startup failures (discovery, loading, registration), broken middleware
/// and handler errors that escape a pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read route directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read route module {}: {source}", path.display())]
    ReadModule {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed route module {}: {source}", path.display())]
    InvalidModule {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("route module {} names unknown handler `{name}` for {method}", path.display())]
    UnknownHandler {
        path: PathBuf,
        method: Method,
        name: String,
    },

    #[error("route path {} is not valid UTF-8", path.display())]
    NonUtf8Path { path: PathBuf },

    #[error("{method} {url} is declared by both {} and {}", first.display(), second.display())]
    RouteConflict {
        method: Method,
        url: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("invalid route `{url}`: {source}")]
    InvalidRoute {
        url: String,
        #[source]
        source: matchit::InsertError,
    },

    /// A middleware invoked its continuation more than once.
    #[error("middleware at position {position} called next() more than once")]
    NextCalledTwice { position: usize },

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}
