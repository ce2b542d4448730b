//! Route registration.
//!
//! Turns discovered routes into router endpoints. Every `(method, route)`
//! pair gets its own pipeline, built once:
//!
//! ```text
//! RequestLogging → ResponseLogging → AuthGate → HandlerStage(handler)
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::auth::TokenVerifier;
use crate::discovery::{discover, ModuleLoader};
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::middleware::{
    compose, AuthGate, BoxedMiddleware, Context, Middleware, Next, RequestLogging, ResponseLogging,
};
use crate::module::LoadedRoute;
use crate::router::Router;

/// Terminal stage: calls the route handler and stores its response.
pub(crate) struct HandlerStage {
    handler: BoxedHandler,
}

impl HandlerStage {
    pub(crate) fn new(handler: BoxedHandler) -> Self {
        Self { handler }
    }
}

impl Middleware for HandlerStage {
    fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        let fut = self.handler.call(ctx.request().clone());
        Box::pin(async move {
            ctx.respond(fut.await?);
            Ok(())
        })
    }
}

/// Builds per-route pipelines and registers them on a [`Router`].
#[derive(Clone)]
pub struct Registrar {
    global: Vec<BoxedMiddleware>,
    gate: BoxedMiddleware,
}

impl Registrar {
    /// Request and response logging, then an [`AuthGate`] using `verifier`.
    pub fn new(verifier: impl TokenVerifier) -> Self {
        Self {
            global: vec![Arc::new(RequestLogging) as BoxedMiddleware, Arc::new(ResponseLogging)],
            gate: Arc::new(AuthGate::new(verifier)),
        }
    }

    /// Appends a middleware that runs after the logging stages and before
    /// the auth gate.
    pub fn with_global(mut self, middleware: impl Middleware) -> Self {
        self.global.push(Arc::new(middleware));
        self
    }

    /// Registers every implemented method of every route.
    ///
    /// Fails without registering further routes if a `(method, url)` pair
    /// is already taken.
    pub fn register(&self, mut router: Router, routes: &[LoadedRoute]) -> Result<Router, Error> {
        for route in routes {
            let meta = Arc::new(route.module.route_meta().clone());
            for method in route.module.methods() {
                let Some(handler) = route.module.handler(method) else { continue };

                let mut chain = self.global.clone();
                chain.push(Arc::clone(&self.gate));
                chain.push(Arc::new(HandlerStage::new(Arc::clone(handler))));

                let pipeline = compose(chain);
                let stages = pipeline.len();
                router.insert(
                    method,
                    &route.url,
                    Arc::clone(&meta),
                    pipeline,
                    Some(route.file_path.clone()),
                )?;
                info!(method = %method, url = %route.url, stages, "route registered");
            }
        }
        Ok(router)
    }

    /// Discovers the routes under `root` with `loader` and registers them.
    pub fn register_dir(
        &self,
        router: Router,
        root: &Path,
        loader: &impl ModuleLoader,
    ) -> Result<Router, Error> {
        let routes = discover(root, loader)?;
        self.register(router, &routes)
    }
}
