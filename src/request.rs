//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

use crate::auth::AuthContext;
use crate::method::Method;

/// An incoming HTTP request, as seen by middleware and handlers.
///
/// The server builds one per hyper request. Tests and embedders build them
/// directly with [`Request::new`] and the `with_*` methods.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) request_id: String,
    pub(crate) auth: AuthContext,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            request_id: String::new(),
            auth: AuthContext::anonymous(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn request_id(&self) -> &str { &self.request_id }

    /// Authentication state set by the auth gate. Anonymous until it runs.
    pub fn auth(&self) -> &AuthContext { &self.auth }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route file `accounts/id.json`, `req.param("id")` on
    /// `/api/accounts/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_auth(&mut self, auth: AuthContext) {
        self.auth = auth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::Get, "/api")
            .with_header("Authorization", "Bearer t");
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("x-missing"), None);
    }

    #[test]
    fn starts_anonymous() {
        let req = Request::new(Method::Post, "/api/x").with_body("{}");
        assert!(!req.auth().is_authenticated);
        assert_eq!(req.body(), b"{}");
    }
}
