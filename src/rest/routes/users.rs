// rest/routes/users.rs — Registration, login, and user records.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::{bad_request, internal_error, not_found, ApiError};
use crate::auth::{hash_password, verify_password, Claims};
use crate::AppContext;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_suspended: Option<bool>,
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let role = body.role.unwrap_or_else(|| "user".to_string());
    if role != "user" && role != "admin" {
        return Err(bad_request("Role must be 'user' or 'admin'"));
    }

    let (full_name, email, password) = match (body.full_name, body.email, body.password) {
        (Some(n), Some(e), Some(p)) if !n.is_empty() && !e.is_empty() && !p.is_empty() => {
            (n, e.to_lowercase(), p)
        }
        _ => return Err(bad_request("All fields are required")),
    };

    if ctx
        .storage
        .get_user_by_email(&email)
        .await
        .map_err(internal_error)?
        .is_some()
    {
        return Err(bad_request("Email already exists"));
    }

    let (salt, hash) = hash_password(&password);
    let user = ctx
        .storage
        .create_user(&full_name, &email, &hash, &salt, &role)
        .await
        .map_err(internal_error)?;
    info!(user_id = %user.id, %role, "registered user");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (email, password) = match (body.email, body.password) {
        (Some(e), Some(p)) => (e.to_lowercase(), p),
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid email or password" })),
            ))
        }
    };

    let user = ctx
        .storage
        .get_user_by_email(&email)
        .await
        .map_err(internal_error)?;
    let Some(user) = user else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        ));
    };
    if !verify_password(&password, &user.password_salt, &user.password_hash) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password" })),
        ));
    }
    if user.is_suspended {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "User is suspended" })),
        ));
    }

    let token = ctx
        .tokens
        .issue(&user.id, &user.email, &user.role)
        .map_err(internal_error)?;
    ctx.storage
        .touch_last_login(&user.id)
        .await
        .map_err(internal_error)?;
    info!(user_id = %user.id, "login");

    Ok(Json(json!({
        "token": token,
        "role": user.role,
        "full_name": user.full_name,
    })))
}

pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match ctx.storage.get_user(&id).await.map_err(internal_error)? {
        Some(user) => Ok(Json(json!(user))),
        None => Err(not_found("User not found")),
    }
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.full_name.is_none()
        && body.email.is_none()
        && body.role.is_none()
        && body.is_suspended.is_none()
    {
        return Err(bad_request("No data to update"));
    }

    let email = body.email.map(|e| e.to_lowercase());
    let updated = ctx
        .storage
        .update_user(
            &id,
            body.full_name.as_deref(),
            email.as_deref(),
            body.role.as_deref(),
            body.is_suspended,
        )
        .await
        .map_err(internal_error)?;
    if !updated {
        return Err(not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// Deleting an account is admin-only even though the route sits on the
/// token-gated router alongside get and update.
pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !claims.is_admin() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Admin access only" })),
        ));
    }

    let deleted = ctx.storage.delete_user(&id).await.map_err(internal_error)?;
    if !deleted {
        return Err(not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

pub async fn list(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let users = ctx.storage.list_users().await.map_err(internal_error)?;
    Ok(Json(json!(users)))
}

pub async fn count(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let total = ctx.storage.count_users().await.map_err(internal_error)?;
    Ok(Json(json!({ "total_users": total })))
}
