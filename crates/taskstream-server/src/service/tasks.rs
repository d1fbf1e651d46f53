use crate::error::ApiError;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use taskstream_common::models::task::{Task, TaskPriority, TaskStats, TaskStatus};
use taskstream_common::validation::validate_task_fields;
use taskstream_db::{
    NewTask, SortOrder, TaskFilter, TaskRepo, TaskRow, TaskSort, TaskUpdate, UserRepo, UserRow,
};
use uuid::Uuid;

/// Query parameters accepted by the task listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub all_users: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

/// Partial update: absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

/// Treat missing and empty-string query values the same way.
fn clean(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_status(raw: &str) -> Result<TaskStatus, ApiError> {
    raw.parse().map_err(ApiError::Validation)
}

fn parse_priority(raw: &str) -> Result<TaskPriority, ApiError> {
    raw.parse().map_err(ApiError::Validation)
}

fn resolve_sort(raw: Option<&str>) -> Result<TaskSort, ApiError> {
    match raw {
        None => Ok(TaskSort::CreatedAt),
        Some("createdAt") => Ok(TaskSort::CreatedAt),
        Some("updatedAt") => Ok(TaskSort::UpdatedAt),
        Some("dueDate") => Ok(TaskSort::DueDate),
        Some("priority") => Ok(TaskSort::Priority),
        Some("title") => Ok(TaskSort::Title),
        Some("status") => Ok(TaskSort::Status),
        Some(other) => Err(ApiError::Validation(format!(
            "Unknown sort field '{other}' (expected: createdAt, updatedAt, dueDate, priority, title or status)"
        ))),
    }
}

fn resolve_order(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw {
        None => Ok(SortOrder::Desc),
        Some("asc") => Ok(SortOrder::Asc),
        Some("desc") => Ok(SortOrder::Desc),
        Some(_) => Err(ApiError::Validation(
            "Sort order must be: asc or desc".to_string(),
        )),
    }
}

fn has_access(row: &TaskRow, user_id: Uuid) -> bool {
    row.owner_id == user_id || row.assigned_to == Some(user_id)
}

async fn fetch_task(state: &AppState, task_id: Uuid) -> Result<TaskRow, ApiError> {
    TaskRepo::get(&state.pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

async fn fetch_accessible(
    state: &AppState,
    current: &UserRow,
    task_id: Uuid,
) -> Result<TaskRow, ApiError> {
    let row = fetch_task(state, task_id).await?;
    if !has_access(&row, current.user_id) {
        return Err(ApiError::Forbidden(
            "Access denied to this task".to_string(),
        ));
    }
    Ok(row)
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    if UserRepo::get_by_id(&state.pool, user_id).await?.is_none() {
        return Err(ApiError::Validation("Assignee user not found".to_string()));
    }
    Ok(())
}

/// List tasks visible to the caller. Admins may pass `allUsers=true` to list
/// across all accounts; for everyone else the flag is silently ignored.
pub async fn list(
    state: &AppState,
    current: &UserRow,
    query: &ListTasksQuery,
) -> Result<(Vec<Task>, serde_json::Value), ApiError> {
    let all_users = current.role == "admin" && query.all_users.as_deref() == Some("true");

    let sort_by = clean(&query.sort_by);
    let sort_order = clean(&query.sort_order);
    let filter = TaskFilter {
        user_id: (!all_users).then_some(current.user_id),
        status: clean(&query.status).map(str::to_string),
        category: clean(&query.category).map(str::to_string),
        priority: clean(&query.priority).map(str::to_string),
        search: clean(&query.search).map(str::to_string),
        sort: resolve_sort(sort_by)?,
        order: resolve_order(sort_order)?,
    };

    let rows = TaskRepo::list(&state.pool, &filter).await?;
    let tasks = rows
        .iter()
        .map(super::task_to_model)
        .collect::<Result<Vec<_>, _>>()?;

    let filters = json!({
        "status": filter.status,
        "category": filter.category,
        "priority": filter.priority,
        "search": filter.search,
        "sortBy": sort_by.unwrap_or("createdAt"),
        "sortOrder": sort_order.unwrap_or("desc"),
        "allUsers": all_users,
    });

    Ok((tasks, filters))
}

pub async fn get(state: &AppState, current: &UserRow, task_id: Uuid) -> Result<Task, ApiError> {
    let row = fetch_accessible(state, current, task_id).await?;
    super::task_to_model(&row)
}

/// Create a task owned by the caller.
pub async fn create(
    state: &AppState,
    current: &UserRow,
    req: &CreateTaskRequest,
) -> Result<Task, ApiError> {
    let Some(title) = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return Err(ApiError::Validation("Task title is required".to_string()));
    };

    let description = req.description.as_deref().unwrap_or("");
    let errors = validate_task_fields(title, description);
    if !errors.is_empty() {
        return Err(ApiError::Validation(format!(
            "Invalid data: {}",
            errors.join(", ")
        )));
    }

    let status = match clean(&req.status) {
        Some(raw) => parse_status(raw)?,
        None => TaskStatus::Pending,
    };
    let priority = match clean(&req.priority) {
        Some(raw) => parse_priority(raw)?,
        None => TaskPriority::Medium,
    };
    let category = clean(&req.category).unwrap_or("general");

    if let Some(assignee) = req.assigned_to {
        ensure_user_exists(state, assignee).await?;
    }

    // A task created directly in `completed` state is stamped immediately
    let completed_at = (status == TaskStatus::Completed).then(Utc::now);

    let row = TaskRepo::create(
        &state.pool,
        Uuid::new_v4(),
        current.user_id,
        &NewTask {
            title,
            description,
            status: status.as_str(),
            priority: priority.as_str(),
            category,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            completed_at,
        },
    )
    .await?;

    super::task_to_model(&row)
}

/// Partial update by the owner or the assignee. `completed_at` is stamped
/// exactly when the status transitions into `completed` and preserved
/// otherwise.
pub async fn update(
    state: &AppState,
    current: &UserRow,
    task_id: Uuid,
    req: &UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let existing = fetch_accessible(state, current, task_id).await?;

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or(existing.title.as_str());
    let description = req
        .description
        .as_deref()
        .unwrap_or(existing.description.as_str());

    let errors = validate_task_fields(title, description);
    if !errors.is_empty() {
        return Err(ApiError::Validation(format!(
            "Invalid data: {}",
            errors.join(", ")
        )));
    }

    let status = match clean(&req.status) {
        Some(raw) => parse_status(raw)?,
        None => existing
            .status
            .parse()
            .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?,
    };
    let priority = match clean(&req.priority) {
        Some(raw) => parse_priority(raw)?,
        None => existing
            .priority
            .parse()
            .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?,
    };

    if let Some(assignee) = req.assigned_to {
        ensure_user_exists(state, assignee).await?;
    }

    let completed_at = if status == TaskStatus::Completed && existing.status != "completed" {
        Some(Utc::now())
    } else {
        existing.completed_at
    };

    let row = TaskRepo::update(
        &state.pool,
        task_id,
        &TaskUpdate {
            title,
            description,
            status: status.as_str(),
            priority: priority.as_str(),
            category: clean(&req.category).unwrap_or(existing.category.as_str()),
            due_date: req.due_date.or(existing.due_date),
            assigned_to: req.assigned_to.or(existing.assigned_to),
            completed_at,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    super::task_to_model(&row)
}

/// Delete a task. Owner only; the assignee keeps read/update access but may
/// not delete.
pub async fn delete(state: &AppState, current: &UserRow, task_id: Uuid) -> Result<(), ApiError> {
    let existing = fetch_task(state, task_id).await?;

    if existing.owner_id != current.user_id {
        return Err(ApiError::Forbidden(
            "Only the task owner can delete it".to_string(),
        ));
    }

    if !TaskRepo::delete(&state.pool, task_id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    Ok(())
}

/// Shorthand for updating the status to `completed`.
pub async fn complete(
    state: &AppState,
    current: &UserRow,
    task_id: Uuid,
) -> Result<Task, ApiError> {
    update(
        state,
        current,
        task_id,
        &UpdateTaskRequest {
            status: Some(TaskStatus::Completed.as_str().to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Reassign a task. Owner only.
pub async fn assign(
    state: &AppState,
    current: &UserRow,
    task_id: Uuid,
    assign_to: Uuid,
) -> Result<Task, ApiError> {
    let existing = fetch_task(state, task_id).await?;

    if existing.owner_id != current.user_id {
        return Err(ApiError::Forbidden(
            "Only the task owner can assign it".to_string(),
        ));
    }

    ensure_user_exists(state, assign_to).await?;

    update(
        state,
        current,
        task_id,
        &UpdateTaskRequest {
            assigned_to: Some(assign_to),
            ..Default::default()
        },
    )
    .await
}

/// Task counters for the caller (owned or assigned tasks).
pub async fn user_stats(state: &AppState, current: &UserRow) -> Result<TaskStats, ApiError> {
    let row = TaskRepo::user_stats(&state.pool, current.user_id).await?;
    Ok(TaskStats {
        total: row.total,
        pending: row.pending,
        in_progress: row.in_progress,
        completed: row.completed,
        overdue: row.overdue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_row(owner: Uuid, assigned: Option<Uuid>) -> TaskRow {
        let now = Utc::now();
        TaskRow {
            task_id: Uuid::new_v4(),
            title: "Task".to_string(),
            description: String::new(),
            status: "pending".to_string(),
            priority: "medium".to_string(),
            category: "general".to_string(),
            due_date: None,
            owner_id: owner,
            assigned_to: assigned,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_has_access_owner() {
        let owner = Uuid::new_v4();
        assert!(has_access(&task_row(owner, None), owner));
    }

    #[test]
    fn test_has_access_assignee() {
        let owner = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        assert!(has_access(&task_row(owner, Some(assignee)), assignee));
    }

    #[test]
    fn test_has_access_stranger_denied() {
        let owner = Uuid::new_v4();
        assert!(!has_access(&task_row(owner, None), Uuid::new_v4()));
    }

    #[test]
    fn test_clean_filters_empty_and_whitespace() {
        assert_eq!(clean(&Some("pending".to_string())), Some("pending"));
        assert_eq!(clean(&Some("  high ".to_string())), Some("high"));
        assert_eq!(clean(&Some(String::new())), None);
        assert_eq!(clean(&Some("   ".to_string())), None);
        assert_eq!(clean(&None), None);
    }

    #[test]
    fn test_resolve_sort_known_fields() {
        assert_eq!(resolve_sort(None).unwrap(), TaskSort::CreatedAt);
        assert_eq!(resolve_sort(Some("dueDate")).unwrap(), TaskSort::DueDate);
        assert_eq!(resolve_sort(Some("title")).unwrap(), TaskSort::Title);
    }

    #[test]
    fn test_resolve_sort_unknown_field() {
        let err = resolve_sort(Some("ownerId")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("ownerId"));
    }

    #[test]
    fn test_resolve_order() {
        assert_eq!(resolve_order(None).unwrap(), SortOrder::Desc);
        assert_eq!(resolve_order(Some("asc")).unwrap(), SortOrder::Asc);
        assert!(resolve_order(Some("descending")).is_err());
    }

    #[test]
    fn test_parse_status_error_names_allowed_values() {
        let err = parse_status("done").unwrap_err();
        assert!(err
            .to_string()
            .contains("pending, in_progress or completed"));
    }

    #[test]
    fn test_list_query_deserializes_camel_case() {
        let query: ListTasksQuery =
            serde_json::from_str(r#"{"sortBy": "dueDate", "sortOrder": "asc", "allUsers": "true"}"#)
                .unwrap();
        assert_eq!(query.sort_by.as_deref(), Some("dueDate"));
        assert_eq!(query.sort_order.as_deref(), Some("asc"));
        assert_eq!(query.all_users.as_deref(), Some("true"));
    }

    #[test]
    fn test_create_request_deserializes_camel_case() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title": "Ship it", "dueDate": "2026-01-01T00:00:00Z", "assignedTo": "550e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Ship it"));
        assert!(req.due_date.is_some());
        assert!(req.assigned_to.is_some());
    }
}
