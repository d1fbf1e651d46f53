use crate::auth::validate_access_token;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;
use taskstream_db::{UserRepo, UserRow};
use uuid::Uuid;

/// Extractor that validates a JWT Bearer token and loads the account it
/// belongs to. Handlers taking `CurrentUser` require authentication; the
/// token subject must still exist in the database.
#[derive(Debug)]
pub struct CurrentUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(val) => val.strip_prefix("Bearer ").ok_or_else(|| {
                ApiError::Unauthorized("Invalid authorization header format".to_string())
            })?,
            None => {
                return Err(ApiError::Unauthorized(
                    "Missing authorization header".to_string(),
                ))
            }
        };

        let claims = validate_access_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;

        match UserRepo::get_by_id(&state.pool, user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => Err(ApiError::Unauthorized("User not found".to_string())),
            Err(e) => Err(ApiError::Internal(e)),
        }
    }
}

/// Extractor for admin-only routes. Role is read from the freshly loaded
/// account row, not from the token, so demotions take effect immediately.
#[derive(Debug)]
pub struct AdminUser(pub UserRow);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != "admin" {
            return Err(ApiError::Forbidden(
                "Access denied: admin privileges required".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}
