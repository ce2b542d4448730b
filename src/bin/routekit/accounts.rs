//! Placeholder account and profile handlers.

use routekit::{BoxError, Handlers, Json, Request};
use serde_json::{json, Value};

/// Every handler the manifests under `api/` refer to.
pub fn handlers() -> Handlers {
    Handlers::new()
        .register("account.summary", summary)
        .register("account.create", create)
        .register("account.show", show)
        .register("profile.show", profile)
}

// GET /api/anon/account
async fn summary(_req: Request) -> Result<Json<Value>, BoxError> {
    Ok(Json(json!({
        "userId": "12345",
        "status": "anon account info",
    })))
}

// POST /api/anon/account
async fn create(req: Request) -> Result<Json<Value>, BoxError> {
    let user_id = req.auth().user.as_ref().map(|user| user.id.as_str());
    Ok(Json(json!({
        "userId": user_id,
        "requestId": req.request_id(),
    })))
}

// GET /api/anon/account/:id
async fn show(req: Request) -> Result<Json<Value>, BoxError> {
    Ok(Json(json!({
        "accountId": req.param("id"),
        "status": "anon account info",
    })))
}

// GET /api/auth/profile
async fn profile(req: Request) -> Result<Json<Value>, BoxError> {
    let user = req.auth().user.as_ref().ok_or("profile reached without an authenticated user")?;
    Ok(Json(json!({ "userId": user.id })))
}
