//! # routekit
//!
//! A small HTTP API scaffold: routes come from the filesystem, requests go
//! through a composed middleware pipeline, and every route declares its own
//! authentication policy.
//!
//! ## The contract
//!
//! A reverse proxy in front of the service owns TLS, rate limiting, body
//! limits and slow clients. routekit owns the rest:
//!
//! - **Discovery** — `api/accounts/id.json` becomes `/api/accounts/:id`
//! - **Pipelines** — onion-ordered middleware with a once-only `next`
//! - **Auth gate** — `Authorization: Bearer …` checked against route metadata
//! - **Serving** — hyper, HTTP/1.1 and HTTP/2, graceful shutdown
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::convert::Infallible;
//! use std::path::Path;
//!
//! use routekit::{
//!     health, Handlers, Json, ManifestLoader, Method, Registrar, Request, Router, Server,
//!     TrustedTokenVerifier,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = ManifestLoader::new(Handlers::new().register("profile.show", profile));
//!
//!     let router = Router::new().on(Method::Get, health::PATH, health::status);
//!     let router = Registrar::new(TrustedTokenVerifier)
//!         .register_dir(router, Path::new("api"), &loader)?;
//!
//!     Server::new(([0, 0, 0, 0], 3000).into()).serve(router).await?;
//!     Ok(())
//! }
//!
//! async fn profile(req: Request) -> Result<Json<Option<String>>, Infallible> {
//!     Ok(Json(req.auth().user.as_ref().map(|u| u.id.clone())))
//! }
//! ```

mod error;
mod handler;
mod method;
mod module;
mod registrar;
mod request;
mod response;
mod router;
mod server;

pub mod auth;
pub mod config;
pub mod discovery;
pub mod health;
pub mod manifest;
pub mod middleware;

pub use auth::{AuthContext, AuthUser, TokenVerifier, TrustedTokenVerifier};
pub use config::Config;
pub use discovery::{discover, ModuleLoader};
pub use error::Error;
pub use handler::{BoxError, BoxFuture, Handler};
pub use manifest::{Handlers, ManifestLoader};
pub use method::{Method, UnsupportedMethod};
pub use middleware::{compose, Context, Middleware, Next, Pipeline};
pub use module::{AuthRequirement, CacheHint, LoadedRoute, RouteMeta, RouteModule};
pub use registrar::Registrar;
pub use request::Request;
pub use response::{IntoResponse, Json, Response};
pub use router::{RouteEntry, Router};
pub use server::{serve_with_shutdown, Server, REQUEST_ID_HEADER};
