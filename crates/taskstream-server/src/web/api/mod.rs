pub mod auth;
pub mod health;
pub mod middleware;
pub mod tasks;
pub mod users;

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub(crate) fn default_limit() -> i64 {
    50
}

/// Parse a path parameter as a UUID, producing a 400 on failure.
pub(crate) fn parse_uuid_param(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("Invalid {} ID", what)))
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(health::health))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        // Task routes (bearer-token protected via extractors)
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/stats", get(tasks::user_stats))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/{id}/complete", patch(tasks::complete_task))
        .route("/tasks/{id}/assign", patch(tasks::assign_task))
        // Admin routes
        .route("/users", get(users::list_users))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_param_valid() {
        let id = parse_uuid_param("550e8400-e29b-41d4-a716-446655440000", "task").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_parse_uuid_param_invalid() {
        let err = parse_uuid_param("42", "task").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid task ID");
    }
}
