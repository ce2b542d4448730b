//! Route modules: the unit discovery produces and the registrar consumes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Deserialize;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Whether a route needs an authenticated caller.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AuthRequirement {
    Required,
    Optional,
    #[default]
    None,
}

/// Declared cache lifetime. Parsed and exposed, never enforced.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheHint {
    pub ttl_seconds: u64,
}

/// Declarative per-route policy.
///
/// `roles` has "any overlap" semantics and is only checked for
/// authenticated callers. `Some` of an empty set admits no authenticated
/// caller at all.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RouteMeta {
    #[serde(default)]
    pub auth: AuthRequirement,
    #[serde(default)]
    pub roles: Option<BTreeSet<String>>,
    #[serde(default)]
    pub cache: Option<CacheHint>,
}

impl RouteMeta {
    pub fn required() -> Self {
        Self { auth: AuthRequirement::Required, ..Self::default() }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// Metadata plus one optional handler per routable method.
#[derive(Clone, Default)]
pub struct RouteModule {
    pub(crate) meta: RouteMeta,
    pub(crate) handlers: BTreeMap<Method, BoxedHandler>,
}

impl RouteModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Sets the handler for `method`, replacing any previous one.
    pub fn on(self, method: Method, handler: impl Handler) -> Self {
        self.on_boxed(method, handler.into_boxed_handler())
    }

    pub fn get(self, handler: impl Handler) -> Self { self.on(Method::Get, handler) }
    pub fn post(self, handler: impl Handler) -> Self { self.on(Method::Post, handler) }
    pub fn put(self, handler: impl Handler) -> Self { self.on(Method::Put, handler) }
    pub fn patch(self, handler: impl Handler) -> Self { self.on(Method::Patch, handler) }
    pub fn delete(self, handler: impl Handler) -> Self { self.on(Method::Delete, handler) }

    pub(crate) fn on_boxed(mut self, method: Method, handler: BoxedHandler) -> Self {
        self.handlers.insert(method, handler);
        self
    }

    pub fn route_meta(&self) -> &RouteMeta {
        &self.meta
    }

    /// Implemented methods in [`Method::ALL`] order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.handlers.keys().copied()
    }

    pub(crate) fn handler(&self, method: Method) -> Option<&BoxedHandler> {
        self.handlers.get(&method)
    }
}

impl std::fmt::Debug for RouteModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteModule")
            .field("meta", &self.meta)
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A module found on disk, with the URL pattern derived from its path.
#[derive(Clone, Debug)]
pub struct LoadedRoute {
    pub url: String,
    pub file_path: PathBuf,
    pub module: RouteModule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_defaults_to_no_auth() {
        let meta: RouteMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta, RouteMeta::default());
        assert_eq!(meta.auth, AuthRequirement::None);
    }

    #[test]
    fn meta_parses_all_fields() {
        let meta: RouteMeta = serde_json::from_str(
            r#"{ "auth": "optional", "roles": ["admin", "admin", "ops"], "cache": { "ttlSeconds": 30 } }"#,
        )
        .unwrap();
        assert_eq!(meta.auth, AuthRequirement::Optional);
        assert_eq!(meta.roles.map(|r| r.len()), Some(2));
        assert_eq!(meta.cache, Some(CacheHint { ttl_seconds: 30 }));
    }

    #[test]
    fn meta_rejects_unknown_requirement() {
        assert!(serde_json::from_str::<RouteMeta>(r#"{ "auth": "sometimes" }"#).is_err());
    }

    #[test]
    fn methods_follow_canonical_order() {
        async fn ok(_: crate::Request) -> Result<&'static str, std::convert::Infallible> {
            Ok("ok")
        }
        let module = RouteModule::new().delete(ok).get(ok).patch(ok);
        assert_eq!(
            module.methods().collect::<Vec<_>>(),
            vec![Method::Get, Method::Patch, Method::Delete]
        );
        assert!(module.handler(Method::Post).is_none());
    }
}
