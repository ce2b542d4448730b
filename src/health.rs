//! Health-check handler.
//!
//! Registered directly on the router, outside the route tree:
//!
//! ```rust,no_run
//! use routekit::{health, Method, Router};
//!
//! let app = Router::new().on(Method::Get, health::PATH, health::status);
//! ```

use std::convert::Infallible;

use serde::Serialize;

use crate::{Json, Request};

pub const PATH: &str = "/health";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Always `200 OK` with `{"status":"ok"}`. If the process answers at all,
/// it is alive; this handler has no dependencies.
pub async fn status(_req: Request) -> Result<Json<Health>, Infallible> {
    Ok(Json(Health { status: "ok" }))
}
