//! Middleware engine.
//!
//! Middleware intercepts a request on its way to the handler and the
//! response on its way back. Each one receives the request's [`Context`]
//! and a [`Next`] continuation:
//!
//! ```text
//! run(ctx) ─▶ A: before ─▶ B: before ─▶ C ─┐
//!                                          │
//!        ◀─ A: after  ◀─ B: after  ◀───────┘
//! ```
//!
//! - `next.run(ctx).await` enters the following middleware and resolves
//!   once everything after it has finished.
//! - Not calling `next` stops the chain there. The auth gate rejects
//!   requests this way.
//! - Calling `next` a second time fails with [`Error::NextCalledTwice`] and
//!   does not enter the following middleware again.
//!
//! A [`Pipeline`] is immutable. Every [`Pipeline::run`] gets its own cursor,
//! so one pipeline serves any number of concurrent requests.

mod auth;
mod logging;

pub use auth::AuthGate;
pub use logging::{RequestLogging, ResponseLogging};

use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::module::RouteMeta;
use crate::request::Request;
use crate::response::Response;

/// Per-request state shared by every middleware in a chain.
#[derive(Debug)]
pub struct Context {
    request: Request,
    meta: Arc<RouteMeta>,
    response: Option<Response>,
}

impl Context {
    pub fn new(request: Request, meta: Arc<RouteMeta>) -> Self {
        Self { request, meta, response: None }
    }

    pub fn request(&self) -> &Request { &self.request }

    /// The matched route's metadata.
    pub fn meta(&self) -> &RouteMeta { &self.meta }

    /// The response produced so far, if any stage has produced one.
    pub fn response(&self) -> Option<&Response> { self.response.as_ref() }

    /// Sets the response, replacing any earlier one.
    pub fn respond(&mut self, response: Response) {
        self.response = Some(response);
    }

    pub fn into_response(self) -> Option<Response> {
        self.response
    }

    pub(crate) fn request_mut(&mut self) -> &mut Request { &mut self.request }
}

/// One stage of a pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>>;
}

pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The continuation handed to a middleware.
pub struct Next<'a> {
    chain: &'a [BoxedMiddleware],
    position: usize,
    cursor: &'a AtomicUsize,
}

impl<'a> Next<'a> {
    /// Runs the rest of the chain. Resolves when it has finished.
    pub fn run<'b>(&'b self, ctx: &'b mut Context) -> BoxFuture<'b, Result<(), Error>> {
        dispatch(self.chain, self.position, self.cursor, ctx)
    }
}

/// Enters the middleware at `position`, at most once per run.
fn dispatch<'a>(
    chain: &'a [BoxedMiddleware],
    position: usize,
    cursor: &'a AtomicUsize,
    ctx: &'a mut Context,
) -> BoxFuture<'a, Result<(), Error>> {
    // The cursor holds one past the furthest position entered.
    let entered = cursor.fetch_max(position + 1, Ordering::AcqRel);
    if entered > position {
        return Box::pin(future::ready(Err(Error::NextCalledTwice {
            position: position.saturating_sub(1),
        })));
    }

    match chain.get(position) {
        Some(middleware) => {
            let next = Next { chain, position: position + 1, cursor };
            middleware.handle(ctx, next)
        }
        None => Box::pin(future::ready(Ok(()))),
    }
}

/// An ordered, immutable middleware chain.
#[derive(Clone)]
pub struct Pipeline {
    chain: Arc<[BoxedMiddleware]>,
}

/// Composes `middleware` into one pipeline, run in list order.
pub fn compose(middleware: Vec<BoxedMiddleware>) -> Pipeline {
    Pipeline { chain: middleware.into() }
}

impl Pipeline {
    pub async fn run(&self, ctx: &mut Context) -> Result<(), Error> {
        let cursor = AtomicUsize::new(0);
        dispatch(&self.chain, 0, &cursor, ctx).await
    }

    /// Number of stages, the handler stage included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use http::StatusCode;

    use crate::method::Method;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Middleware for Recorder {
        fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("enter{}", self.name));
                next.run(ctx).await?;
                self.log.lock().unwrap().push(format!("exit{}", self.name));
                Ok(())
            })
        }
    }

    struct CallsNextTwice;

    impl Middleware for CallsNextTwice {
        fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
            Box::pin(async move {
                next.run(ctx).await?;
                next.run(ctx).await
            })
        }
    }

    struct Halt;

    impl Middleware for Halt {
        fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
            ctx.respond(Response::status(StatusCode::IM_A_TEAPOT));
            Box::pin(future::ready(Ok(())))
        }
    }

    fn recorder(name: &'static str, log: &Log) -> BoxedMiddleware {
        Arc::new(Recorder { name, log: Arc::clone(log) })
    }

    fn context() -> Context {
        Context::new(Request::new(Method::Get, "/api"), Arc::default())
    }

    #[tokio::test]
    async fn runs_in_onion_order() {
        let log = Log::default();
        let pipeline = compose(vec![recorder("A", &log), recorder("B", &log), recorder("C", &log)]);

        pipeline.run(&mut context()).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["enterA", "enterB", "enterC", "exitC", "exitB", "exitA"]
        );
    }

    #[tokio::test]
    async fn second_next_call_fails_without_reentering() {
        let log = Log::default();
        let chain: Vec<BoxedMiddleware> = vec![
            recorder("A", &log),
            Arc::new(CallsNextTwice),
            recorder("C", &log),
        ];
        let pipeline = compose(chain);

        let err = pipeline.run(&mut context()).await.unwrap_err();

        assert!(matches!(err, Error::NextCalledTwice { position: 1 }), "{err}");
        assert_eq!(*log.lock().unwrap(), ["enterA", "enterC", "exitC"]);
    }

    #[tokio::test]
    async fn not_calling_next_short_circuits() {
        let log = Log::default();
        let chain: Vec<BoxedMiddleware> = vec![recorder("A", &log), Arc::new(Halt), recorder("C", &log)];
        let pipeline = compose(chain);
        let mut ctx = context();

        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(*log.lock().unwrap(), ["enterA", "exitA"]);
        assert_eq!(ctx.response().map(Response::status_code), Some(StatusCode::IM_A_TEAPOT));
    }

    #[tokio::test]
    async fn pipeline_is_reusable() {
        let log = Log::default();
        let pipeline = compose(vec![recorder("A", &log)]);

        pipeline.run(&mut context()).await.unwrap();
        pipeline.run(&mut context()).await.unwrap();

        assert_eq!(log.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn empty_pipeline_completes() {
        let pipeline = compose(Vec::new());
        assert_eq!(pipeline.len(), 0);
        let mut ctx = context();
        pipeline.run(&mut ctx).await.unwrap();
        assert!(ctx.response().is_none());
    }
}
