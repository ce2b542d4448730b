//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A route module maps each method to a handler of its own concrete type,
//! and the manifest loader keeps many of them in one registry. Rust
//! collections hold one concrete type, so handlers are hidden behind a
//! trait object (`dyn ErasedHandler`) and stored uniformly.
//!
//! ```text
//! async fn show(req: Request) -> Result<Json<T>, E>   ← user writes this
//!        ↓ RouteModule::new().get(show)
//! show.into_boxed_handler()                           ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(show))                           ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time                  ← one vtable dispatch
//!        ↓
//! Box::pin(async { show(req).await.map(into_response) })
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased `Send` future.
///
/// `Pin<Box<…>>` is required because the runtime polls the future in place.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The error type handlers may fail with. Anything convertible into it
/// (`std::io::Error`, `anyhow::Error`, your own error enum) works.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any `async fn`
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> Result<impl IntoResponse, impl Into<BoxError>>
/// ```
///
/// An `Err` is not turned into a response here: it leaves the pipeline as
/// [`Error::Handler`] and reaches the router's top-level error handling.
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R, E> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
}

impl<F, Fut, R, E> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype wrapper bridging a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R, E> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Response, Error>> {
        let fut = (self.0)(req);
        Box::pin(async move {
            fut.await
                .map(IntoResponse::into_response)
                .map_err(|e| Error::Handler(e.into()))
        })
    }
}
