//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Each leaf is an
//! endpoint: the route's metadata plus its composed [`Pipeline`]. Build the
//! router once at startup; it is never mutated while serving.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;
use tracing::error;

use crate::error::Error;
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::{compose, BoxedMiddleware, Context, Pipeline};
use crate::module::RouteMeta;
use crate::registrar::HandlerStage;
use crate::request::Request;
use crate::response::Response;

#[derive(Clone)]
struct Endpoint {
    meta: Arc<RouteMeta>,
    pipeline: Pipeline,
}

/// A registered `(method, url)` pair and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: Method,
    pub url: String,
    pub source: Option<PathBuf>,
}

/// The application router.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Endpoint>>,
    table: Vec<RouteEntry>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), table: Vec::new() }
    }

    /// Registers a bare handler with no middleware and default metadata.
    /// Meant for fixed endpoints such as `/health`. Returns `self` for chaining.
    ///
    /// `:id` is the only path parameter, as for discovered routes. Every
    /// other segment matches literally.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or already registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let stage: BoxedMiddleware = Arc::new(HandlerStage::new(handler.into_boxed_handler()));
        let pipeline = compose(vec![stage]);
        if let Err(e) = self.insert(method, path, Arc::default(), pipeline, None) {
            panic!("invalid route `{path}`: {e}");
        }
        self
    }

    /// Registers a composed pipeline. Fails if `(method, url)` is taken.
    pub fn insert(
        &mut self,
        method: Method,
        url: &str,
        meta: Arc<RouteMeta>,
        pipeline: Pipeline,
        source: Option<PathBuf>,
    ) -> Result<(), Error> {
        if let Some(existing) = self.table.iter().find(|r| r.method == method && r.url == url) {
            return Err(Error::RouteConflict {
                method,
                url: url.to_owned(),
                first: existing.source.clone().unwrap_or_default(),
                second: source.unwrap_or_default(),
            });
        }

        self.routes
            .entry(method)
            .or_default()
            .insert(to_matchit(url), Endpoint { meta, pipeline })
            .map_err(|source| Error::InvalidRoute { url: url.to_owned(), source })?;
        self.table.push(RouteEntry { method, url: url.to_owned(), source });
        Ok(())
    }

    /// Every registration, in order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.table
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(Endpoint, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let endpoint = matched.value.clone();
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((endpoint, params))
    }

    /// Routes one request through its pipeline and produces one response.
    ///
    /// This is the single top-level error handler: anything a pipeline
    /// returns as `Err` is logged and answered with `500`.
    pub async fn handle(&self, mut request: Request) -> Response {
        let Some((endpoint, params)) = self.lookup(request.method(), request.path()) else {
            return Response::status(StatusCode::NOT_FOUND);
        };
        request.params = params;

        let request_id = request.request_id().to_owned();
        let mut ctx = Context::new(request, endpoint.meta);
        if let Err(e) = endpoint.pipeline.run(&mut ctx).await {
            error!(request_id = %request_id, error = %e, "request failed");
            return internal_error();
        }

        ctx.into_response().unwrap_or_else(|| {
            error!(request_id = %request_id, "pipeline finished without a response");
            internal_error()
        })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("table", &self.table).finish_non_exhaustive()
    }
}

fn internal_error() -> Response {
    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error")
}

/// `/api/accounts/:id` → `/api/accounts/{id}`. Braces in any other segment
/// are escaped so they match literally.
fn to_matchit(url: &str) -> String {
    url.split('/')
        .map(|segment| match segment {
            ":id" => "{id}".to_owned(),
            literal => literal.replace('{', "{{").replace('}', "}}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use crate::response::Json;

    async fn echo_id(req: Request) -> Result<Json<serde_json::Value>, Infallible> {
        Ok(Json(serde_json::json!({ "id": req.param("id") })))
    }

    async fn fails(_: Request) -> Result<Response, std::io::Error> {
        Err(std::io::Error::other("boom"))
    }

    #[test]
    fn converts_parameter_syntax() {
        assert_eq!(to_matchit("/api/accounts/:id"), "/api/accounts/{id}");
        assert_eq!(to_matchit("/api"), "/api");
    }

    #[test]
    fn other_segments_stay_literal() {
        assert_eq!(to_matchit("/api/users/:name"), "/api/users/:name");
        assert_eq!(to_matchit("/api/{slug}"), "/api/{{slug}}");
        assert_eq!(to_matchit("/api/:id/x{y}"), "/api/{id}/x{{y}}");
    }

    #[tokio::test]
    async fn colon_segments_other_than_id_are_not_parameters() {
        let router = Router::new().on(Method::Get, "/api/users/:name", echo_id);
        let res = router.handle(Request::new(Method::Get, "/api/users/bob")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let res = router.handle(Request::new(Method::Get, "/api/users/:name")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn extracts_path_parameters() {
        let router = Router::new().on(Method::Get, "/api/accounts/:id", echo_id);
        let res = router.handle(Request::new(Method::Get, "/api/accounts/42")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), br#"{"id":"42"}"#);
    }

    #[tokio::test]
    async fn unknown_path_or_method_is_404() {
        let router = Router::new().on(Method::Get, "/api/accounts/:id", echo_id);
        let res = router.handle(Request::new(Method::Get, "/api/missing")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        let res = router.handle(Request::new(Method::Delete, "/api/accounts/1")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_error_becomes_500() {
        let router = Router::new().on(Method::Post, "/api/fail", fails);
        let res = router.handle(Request::new(Method::Post, "/api/fail")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["code"], "INTERNAL_ERROR");
    }

    #[test]
    fn duplicate_registration_is_a_conflict() {
        let mut router = Router::new().on(Method::Get, "/api/x", echo_id);
        let pipeline = compose(Vec::new());
        let err = router
            .insert(Method::Get, "/api/x", Arc::default(), pipeline.clone(), Some("x.json".into()))
            .unwrap_err();
        assert!(matches!(err, Error::RouteConflict { method: Method::Get, .. }), "{err}");
        router.insert(Method::Post, "/api/x", Arc::default(), pipeline, None).unwrap();
        assert_eq!(router.routes().len(), 2);
    }
}
