//! Per-request authentication context and token verification.
//!
//! The [`AuthGate`](crate::middleware::AuthGate) turns the `Authorization`
//! header into an [`AuthContext`] through a [`TokenVerifier`]. Swap the
//! verifier to change how tokens are checked; the header contract and the
//! failure responses stay the same.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::handler::BoxFuture;

/// Role granted to every user accepted by [`TrustedTokenVerifier`].
pub const DEFAULT_ROLE: &str = "user";

/// An authenticated principal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub roles: BTreeSet<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// `true` when the user holds at least one of `allowed`.
    pub fn has_any_role(&self, allowed: &BTreeSet<String>) -> bool {
        !self.roles.is_disjoint(allowed)
    }
}

/// Authentication state of one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user: Option<AuthUser>,
    pub is_authenticated: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: AuthUser) -> Self {
        Self { user: Some(user), is_authenticated: true }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for any other scheme or an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Turns a bearer token into a user.
///
/// Returning `None` rejects the token; the request continues as
/// unauthenticated and the route policy decides what happens next.
pub trait TokenVerifier: Send + Sync + 'static {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<AuthUser>>;
}

/// Accepts every non-empty token as the user id, with the single role
/// [`DEFAULT_ROLE`].
///
/// This performs no verification at all.
// TODO: replace with signed-token verification before exposing any route with `auth: required`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrustedTokenVerifier;

impl TokenVerifier for TrustedTokenVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Option<AuthUser>> {
        Box::pin(async move { Some(AuthUser::new(token, [DEFAULT_ROLE])) })
    }
}
