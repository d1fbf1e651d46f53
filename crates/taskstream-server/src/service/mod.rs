//! Service layer: ownership and validation rules between the HTTP handlers
//! and the repositories.

pub mod auth;
pub mod tasks;

use crate::error::ApiError;
use taskstream_common::models::auth::{User, UserRole};
use taskstream_common::models::task::{self, Task, TaskPriority, TaskStatus};
use taskstream_db::{TaskRow, UserRow};

/// Project a DB row to the client-safe user model (no password hash).
pub fn user_to_model(row: &UserRow) -> Result<User, ApiError> {
    let role: UserRole = row
        .role
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;
    Ok(User {
        id: row.user_id,
        name: row.name.clone(),
        email: row.email.clone(),
        role,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Project a DB row to the API task model, deriving `isOverdue`.
pub fn task_to_model(row: &TaskRow) -> Result<Task, ApiError> {
    let status: TaskStatus = row
        .status
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;
    let priority: TaskPriority = row
        .priority
        .parse()
        .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;
    Ok(Task {
        id: row.task_id,
        title: row.title.clone(),
        description: row.description.clone(),
        status,
        priority,
        category: row.category.clone(),
        due_date: row.due_date,
        owner_id: row.owner_id,
        assigned_to: row.assigned_to,
        created_at: row.created_at,
        updated_at: row.updated_at,
        completed_at: row.completed_at,
        is_overdue: task::is_overdue(status, row.due_date, chrono::Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn user_row(role: &str) -> UserRow {
        UserRow {
            user_id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task_row() -> TaskRow {
        let now = Utc::now();
        TaskRow {
            task_id: Uuid::new_v4(),
            title: "Task".to_string(),
            description: String::new(),
            status: "pending".to_string(),
            priority: "medium".to_string(),
            category: "general".to_string(),
            due_date: None,
            owner_id: Uuid::new_v4(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn test_user_to_model_parses_role() {
        let model = user_to_model(&user_row("admin")).unwrap();
        assert_eq!(model.role, UserRole::Admin);
    }

    #[test]
    fn test_user_to_model_rejects_corrupt_role() {
        let err = user_to_model(&user_row("root")).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_task_to_model_derives_overdue() {
        let mut row = task_row();
        row.due_date = Some(Utc::now() - Duration::hours(1));
        let model = task_to_model(&row).unwrap();
        assert!(model.is_overdue);
    }

    #[test]
    fn test_task_to_model_completed_not_overdue() {
        let mut row = task_row();
        row.status = "completed".to_string();
        row.due_date = Some(Utc::now() - Duration::hours(1));
        row.completed_at = Some(Utc::now());
        let model = task_to_model(&row).unwrap();
        assert!(!model.is_overdue);
        assert_eq!(model.status, TaskStatus::Completed);
    }

    #[test]
    fn test_task_to_model_rejects_corrupt_status() {
        let mut row = task_row();
        row.status = "archived".to_string();
        assert!(task_to_model(&row).is_err());
    }
}
