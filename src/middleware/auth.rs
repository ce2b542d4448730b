//! Authentication gate.
//!
//! Reads `Authorization: Bearer <token>`, resolves it through the
//! configured [`TokenVerifier`], attaches the resulting [`AuthContext`] to
//! the request and enforces the route's [`RouteMeta`] policy:
//!
//! | Condition | Outcome |
//! |---|---|
//! | `auth: required`, not authenticated | `401 UNAUTHORIZED`, chain stops |
//! | authenticated, `roles` declared, no overlap | `403 FORBIDDEN`, chain stops |
//! | anything else | continue |

use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use super::{Context, Middleware, Next};
use crate::auth::{bearer_token, AuthContext, TokenVerifier, TrustedTokenVerifier};
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::module::AuthRequirement;
use crate::response::Response;

#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: impl TokenVerifier) -> Self {
        Self { verifier: Arc::new(verifier) }
    }

    async fn authenticate(&self, header: Option<&str>) -> AuthContext {
        let Some(token) = header.and_then(bearer_token) else {
            return AuthContext::anonymous();
        };
        match self.verifier.verify(token).await {
            Some(user) => AuthContext::authenticated(user),
            None => {
                debug!(target: "routekit.auth", "token rejected by verifier");
                AuthContext::anonymous()
            }
        }
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(TrustedTokenVerifier)
    }
}

impl Middleware for AuthGate {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<(), Error>> {
        Box::pin(async move {
            let auth = self.authenticate(ctx.request().header("authorization")).await;
            let meta = ctx.meta();

            if meta.auth == AuthRequirement::Required && !auth.is_authenticated {
                debug!(target: "routekit.auth", path = ctx.request().path(), "authentication required");
                ctx.request_mut().set_auth(auth);
                ctx.respond(Response::error(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authentication required",
                ));
                return Ok(());
            }

            let forbidden = match (&auth.user, &meta.roles) {
                (Some(user), Some(allowed)) => !user.has_any_role(allowed),
                _ => false,
            };
            ctx.request_mut().set_auth(auth);

            if forbidden {
                debug!(target: "routekit.auth", path = ctx.request().path(), "insufficient permissions");
                ctx.respond(Response::error(
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Insufficient permissions",
                ));
                return Ok(());
            }

            next.run(ctx).await
        })
    }
}
