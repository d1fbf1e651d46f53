use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub task_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields for task creation. Status and priority arrive pre-validated from
/// the service layer as their canonical string forms.
#[derive(Debug, Clone)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub category: &'a str,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Full replacement values for an update. The service merges the existing row
/// with the request (including the completed_at transition stamp) before
/// calling [`TaskRepo::update`]; owner_id and created_at are never touched.
#[derive(Debug, Clone)]
pub struct TaskUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub category: &'a str,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Sortable columns. Identifiers cannot be bound as query parameters, so the
/// ORDER BY column is restricted to this whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Priority,
    Title,
    Status,
}

impl TaskSort {
    fn column(&self) -> &'static str {
        match self {
            TaskSort::CreatedAt => "created_at",
            TaskSort::UpdatedAt => "updated_at",
            TaskSort::DueDate => "due_date",
            TaskSort::Priority => "priority",
            TaskSort::Title => "title",
            TaskSort::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Listing filter. `user_id: None` lists across all users (admin view);
/// otherwise only tasks the user owns or is assigned to are returned.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort: TaskSort,
    pub order: SortOrder,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskStatsRow {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
}

/// Escape LIKE wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub struct TaskRepo;

impl TaskRepo {
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        owner_id: Uuid,
        task: &NewTask<'_>,
    ) -> Result<TaskRow> {
        let row = sqlx::query_as::<_, TaskRow>(
            "INSERT INTO task (task_id, title, description, status, priority, category, due_date, owner_id, assigned_to, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING task_id, title, description, status, priority, category, due_date, owner_id, assigned_to, created_at, updated_at, completed_at",
        )
        .bind(task_id)
        .bind(task.title)
        .bind(task.description)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.category)
        .bind(task.due_date)
        .bind(owner_id)
        .bind(task.assigned_to)
        .bind(task.completed_at)
        .fetch_one(pool)
        .await
        .context("Failed to create task")?;
        Ok(row)
    }

    pub async fn get(pool: &PgPool, task_id: Uuid) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT task_id, title, description, status, priority, category, due_date, owner_id, assigned_to, created_at, updated_at, completed_at
             FROM task WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get task")?;
        Ok(row)
    }

    pub async fn list(pool: &PgPool, filter: &TaskFilter) -> Result<Vec<TaskRow>> {
        let sql = format!(
            "SELECT task_id, title, description, status, priority, category, due_date, owner_id, assigned_to, created_at, updated_at, completed_at
             FROM task
             WHERE ($1::uuid IS NULL OR owner_id = $1 OR assigned_to = $1)
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR category = $3)
               AND ($4::text IS NULL OR priority = $4)
               AND ($5::text IS NULL OR title ILIKE $5 OR description ILIKE $5)
             ORDER BY {} {}",
            filter.sort.column(),
            filter.order.keyword(),
        );
        let search_pattern = filter
            .search
            .as_deref()
            .map(|term| format!("%{}%", escape_like(term)));

        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(filter.user_id)
            .bind(filter.status.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.priority.as_deref())
            .bind(search_pattern)
            .fetch_all(pool)
            .await
            .context("Failed to list tasks")?;
        Ok(rows)
    }

    pub async fn update(
        pool: &PgPool,
        task_id: Uuid,
        update: &TaskUpdate<'_>,
    ) -> Result<Option<TaskRow>> {
        let row = sqlx::query_as::<_, TaskRow>(
            "UPDATE task
             SET title = $2, description = $3, status = $4, priority = $5, category = $6,
                 due_date = $7, assigned_to = $8, completed_at = $9, updated_at = NOW()
             WHERE task_id = $1
             RETURNING task_id, title, description, status, priority, category, due_date, owner_id, assigned_to, created_at, updated_at, completed_at",
        )
        .bind(task_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.status)
        .bind(update.priority)
        .bind(update.category)
        .bind(update.due_date)
        .bind(update.assigned_to)
        .bind(update.completed_at)
        .fetch_optional(pool)
        .await
        .context("Failed to update task")?;
        Ok(row)
    }

    pub async fn delete(pool: &PgPool, task_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM task WHERE task_id = $1")
            .bind(task_id)
            .execute(pool)
            .await
            .context("Failed to delete task")?;
        Ok(result.rows_affected() > 0)
    }

    /// Counters over tasks the user owns or is assigned to. Overdue means a
    /// due date in the past on a task that is not completed.
    pub async fn user_stats(pool: &PgPool, user_id: Uuid) -> Result<TaskStatsRow> {
        let row = sqlx::query_as::<_, TaskStatsRow>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                    COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                    COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                    COUNT(*) FILTER (WHERE due_date IS NOT NULL AND due_date < NOW() AND status <> 'completed') AS overdue
             FROM task
             WHERE owner_id = $1 OR assigned_to = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .context("Failed to compute user stats")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_term() {
        assert_eq!(escape_like("dashboard"), "dashboard");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_sort_columns_whitelisted() {
        assert_eq!(TaskSort::CreatedAt.column(), "created_at");
        assert_eq!(TaskSort::DueDate.column(), "due_date");
        assert_eq!(TaskSort::Title.column(), "title");
    }

    #[test]
    fn test_filter_defaults() {
        let filter = TaskFilter::default();
        assert_eq!(filter.sort, TaskSort::CreatedAt);
        assert_eq!(filter.order, SortOrder::Desc);
        assert!(filter.user_id.is_none());
        assert!(filter.search.is_none());
    }

    #[test]
    fn test_sort_order_keywords() {
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }
}
