use crate::error::ApiError;
use crate::service;
use crate::service::auth::RegisterRequest;
use crate::state::AppState;
use crate::web::api::middleware::CurrentUser;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/register
#[tracing::instrument(skip(state, req))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = service::auth::register(&state, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": {"user": payload.user, "token": payload.token},
        })),
    ))
}

/// POST /api/v1/auth/login
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = service::auth::login(&state, req.email.trim(), &req.password).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {"user": payload.user, "token": payload.token},
    })))
}

/// GET /api/v1/auth/me
#[tracing::instrument(skip(auth))]
pub async fn me(auth: CurrentUser) -> Result<impl IntoResponse, ApiError> {
    let user = service::user_to_model(&auth.0)?;
    Ok(Json(json!({
        "success": true,
        "data": {"user": user},
    })))
}

/// POST /api/v1/auth/logout -- access tokens are stateless, nothing to revoke
#[tracing::instrument(skip(_auth))]
pub async fn logout(_auth: CurrentUser) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logout successful",
    }))
}
