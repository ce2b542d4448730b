//! Global request/response logging stages.

use std::time::Instant;

use tracing::info;

use super::{Context, Middleware, Next};
use crate::error::Error;
use crate::handler::BoxFuture;

/// Logs `request start` before anything else runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLogging;

impl Middleware for RequestLogging {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let req = ctx.request();
            info!(
                method = %req.method(),
                path = req.path(),
                request_id = req.request_id(),
                "request start"
            );
            next.run(ctx).await
        })
    }
}

/// Logs `request complete` with the final status once the rest of the
/// chain has finished. Nothing is logged if the chain failed; the error is
/// reported where it is handled.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseLogging;

impl Middleware for ResponseLogging {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let started = Instant::now();
            next.run(ctx).await?;
            let status = ctx.response().map(|r| r.status_code().as_u16());
            info!(
                status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                request_id = ctx.request().request_id(),
                "request complete"
            );
            Ok(())
        })
    }
}
