// rest/auth.rs — Bearer-token middleware for the REST API.
//
// Verified claims are attached to the request as an Extension so handlers
// (and the admin gate) can read them without re-verifying.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{AuthError, Claims};
use crate::AppContext;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn reject(err: &AuthError) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

/// Require a valid bearer token; on success the claims ride along as an
/// Extension.
pub async fn require_auth(
    State(ctx): State<Arc<AppContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        return reject(&AuthError::Missing);
    };

    match ctx.tokens.verify(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => reject(&e),
    }
}

/// Require the admin role. Must run inside `require_auth`, which provides
/// the claims extension.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let is_admin = req
        .extensions()
        .get::<Claims>()
        .map(Claims::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Admin access only" })),
        )
            .into_response();
    }
    next.run(req).await
}

/// Best-effort claims for endpoints that work both signed-in and anonymous.
pub fn optional_claims(ctx: &AppContext, headers: &HeaderMap) -> Option<Claims> {
    let token = bearer_token(headers)?;
    ctx.tokens.verify(&token).ok()
}
