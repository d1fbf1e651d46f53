use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// GET / -- public API banner with an endpoint index
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "message": "TaskStream API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "endpoints": {
            "health": "/api/v1/health",
            "auth": {
                "register": "POST /api/v1/auth/register",
                "login": "POST /api/v1/auth/login",
                "profile": "GET /api/v1/auth/me",
                "logout": "POST /api/v1/auth/logout",
            },
            "tasks": {
                "list": "GET /api/v1/tasks",
                "create": "POST /api/v1/tasks",
                "stats": "GET /api/v1/tasks/stats",
            },
        },
    }))
}

/// GET /api/v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "TaskStream API",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptimeSecs": state.uptime_secs(),
        "environment": state.config.environment,
    }))
}
