use crate::error::ApiError;
use crate::service;
use crate::service::tasks::{CreateTaskRequest, ListTasksQuery, UpdateTaskRequest};
use crate::state::AppState;
use crate::web::api::middleware::CurrentUser;
use crate::web::api::parse_uuid_param;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// GET /api/v1/tasks - List tasks visible to the caller
#[tracing::instrument(skip(state, auth, query))]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Query(query): Query<ListTasksQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (tasks, filters) = service::tasks::list(&state, &auth.0, &query).await?;
    let total = tasks.len();
    Ok(Json(json!({
        "success": true,
        "data": {"tasks": tasks, "total": total, "filters": filters},
    })))
}

/// GET /api/v1/tasks/stats - Task counters for the caller
#[tracing::instrument(skip(state, auth))]
pub async fn user_stats(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = service::tasks::user_stats(&state, &auth.0).await?;
    Ok(Json(json!({
        "success": true,
        "data": {"stats": stats},
    })))
}

/// GET /api/v1/tasks/:id - Get a single task
#[tracing::instrument(skip(state, auth))]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_uuid_param(&id, "task")?;
    let task = service::tasks::get(&state, &auth.0, task_id).await?;
    Ok(Json(json!({
        "success": true,
        "data": {"task": task},
    })))
}

/// POST /api/v1/tasks - Create a task owned by the caller
#[tracing::instrument(skip(state, auth, req))]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = service::tasks::create(&state, &auth.0, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Task created successfully",
            "data": {"task": task},
        })),
    ))
}

/// PUT /api/v1/tasks/:id - Partial update by owner or assignee
#[tracing::instrument(skip(state, auth, req))]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_uuid_param(&id, "task")?;
    let task = service::tasks::update(&state, &auth.0, task_id, &req).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Task updated successfully",
        "data": {"task": task},
    })))
}

/// DELETE /api/v1/tasks/:id - Owner only
#[tracing::instrument(skip(state, auth))]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_uuid_param(&id, "task")?;
    service::tasks::delete(&state, &auth.0, task_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}

/// PATCH /api/v1/tasks/:id/complete - Mark a task completed
#[tracing::instrument(skip(state, auth))]
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_uuid_param(&id, "task")?;
    let task = service::tasks::complete(&state, &auth.0, task_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Task marked as completed",
        "data": {"task": task},
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignRequest {
    pub assign_to_user_id: Option<Uuid>,
}

/// PATCH /api/v1/tasks/:id/assign - Reassign a task (owner only)
#[tracing::instrument(skip(state, auth, req))]
pub async fn assign_task(
    State(state): State<Arc<AppState>>,
    auth: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_uuid_param(&id, "task")?;
    let Some(assign_to) = req.assign_to_user_id else {
        return Err(ApiError::Validation(
            "assignToUserId is required".to_string(),
        ));
    };
    let task = service::tasks::assign(&state, &auth.0, task_id, assign_to).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Task assigned successfully",
        "data": {"task": task},
    })))
}
