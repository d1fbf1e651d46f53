use crate::error::ApiError;
use crate::service;
use crate::state::AppState;
use crate::web::api::default_limit;
use crate::web::api::middleware::AdminUser;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use taskstream_db::UserRepo;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/v1/users - List accounts (admin only)
#[tracing::instrument(skip(state, _admin, query))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = UserRepo::list(&state.pool, query.limit, query.offset).await?;
    let users = rows
        .iter()
        .map(service::user_to_model)
        .collect::<Result<Vec<_>, _>>()?;
    let total = users.len();
    Ok(Json(json!({
        "success": true,
        "data": {"users": users, "total": total},
    })))
}
