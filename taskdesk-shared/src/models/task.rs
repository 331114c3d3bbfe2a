/// Task model and database operations
///
/// This module provides the Task model representing a user's to-do item, the
/// status enumeration with its single guarded transition, and pagination input.
///
/// # State Machine
///
/// ```text
/// TODO ⇄ IN_PROGRESS ⇄ DONE      (any → any is allowed)
/// IN_PROGRESS → PENDING           (the only way into PENDING)
/// PENDING → anything but PENDING
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'DONE', 'PENDING');
///
/// CREATE TABLE tasks (
///     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL
/// );
/// ```
///
/// Every query here is keyed on `(id, user_id)` so that ownership is checked in
/// the same statement as the read or write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Largest page size accepted by list queries
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Task status
///
/// Declaration order matches the PostgreSQL enum order, so sorting by status
/// behaves the same in every store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet (initial state)
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,

    /// Parked while in progress
    Pending,
}

impl TaskStatus {
    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Pending => "PENDING",
        }
    }

    /// Checks if transition to target status is allowed
    ///
    /// PENDING can only be reached from IN_PROGRESS; everything else is free.
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        match target {
            TaskStatus::Pending => *self == TaskStatus::InProgress,
            _ => true,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task model representing a to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Server-generated task ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created (never changes)
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Timestamps and initial status are chosen by the task service.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column a task list can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Title,
    Status,
    #[default]
    #[serde(alias = "created_at")]
    CreatedAt,
    #[serde(alias = "updated_at")]
    UpdatedAt,
}

impl SortField {
    /// Database column for this field (whitelisted, safe to splice into SQL)
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Page request for task lists
///
/// Pages are zero-based. The task id is always used as a secondary sort key in
/// the same direction so that ordering is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortField,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortField::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PageRequest {
    /// Number of rows to return
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    /// `ORDER BY` clause for this request
    pub fn order_by(&self) -> String {
        let direction = self.direction.as_sql();
        match self.sort {
            SortField::Id => format!("ORDER BY id {}", direction),
            field => format!("ORDER BY {} {}, id {}", field.column(), direction, direction),
        }
    }
}

const TASK_COLUMNS: &str = "id, user_id, title, description, status, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the owning user doesn't exist (foreign key
    /// violation) or the database connection fails
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.created_at)
        .bind(data.updated_at)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with owner isolation
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks with pagination and caller-chosen ordering
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 {} LIMIT $2 OFFSET $3",
            TASK_COLUMNS,
            page.order_by()
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Gets a user's newest tasks (highest id wins on equal timestamps)
    pub async fn most_recent(
        pool: &PgPool,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
            TASK_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Sets a new status if the task is still owned by `user_id` and still
    /// has status `expected`
    ///
    /// # Returns
    ///
    /// The updated task, or None if no row matched all three conditions
    pub async fn update_status(
        pool: &PgPool,
        id: i64,
        user_id: i64,
        expected: TaskStatus,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $4,
                updated_at = $5
            WHERE id = $1 AND user_id = $2 AND status = $3
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(expected)
        .bind(status)
        .bind(updated_at)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task owned by `user_id`
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if no such task exists for this owner
    pub async fn delete_by_id_and_user(
        pool: &PgPool,
        id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Pending,
    ];

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "TODO");
        assert_eq!(TaskStatus::InProgress.as_str(), "IN_PROGRESS");
        assert_eq!(TaskStatus::Done.as_str(), "DONE");
        assert_eq!(TaskStatus::Pending.as_str(), "PENDING");
    }

    #[test]
    fn test_task_status_serde_matches_as_str() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        let parsed: TaskStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
    }

    #[test]
    fn test_only_in_progress_may_become_pending() {
        for from in ALL {
            assert_eq!(
                from.can_transition_to(TaskStatus::Pending),
                from == TaskStatus::InProgress,
                "{} -> PENDING",
                from
            );
        }
    }

    #[test]
    fn test_other_transitions_are_unrestricted() {
        for from in ALL {
            for to in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
                assert!(from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_page_request_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.page, 0);
        assert_eq!(page.size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.sort, SortField::CreatedAt);
        assert_eq!(page.direction, SortDirection::Desc);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_request_offset() {
        let page = PageRequest {
            page: 3,
            size: 20,
            ..Default::default()
        };
        assert_eq!(page.limit(), 20);
        assert_eq!(page.offset(), 60);
    }

    #[test]
    fn test_order_by_uses_id_as_tiebreaker() {
        assert_eq!(
            PageRequest::default().order_by(),
            "ORDER BY created_at DESC, id DESC"
        );

        let by_title = PageRequest {
            sort: SortField::Title,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        assert_eq!(by_title.order_by(), "ORDER BY title ASC, id ASC");

        let by_id = PageRequest {
            sort: SortField::Id,
            ..Default::default()
        };
        assert_eq!(by_id.order_by(), "ORDER BY id DESC");
    }

    #[test]
    fn test_sort_field_accepts_camel_and_snake_case() {
        let camel: SortField = serde_json::from_str("\"createdAt\"").unwrap();
        let snake: SortField = serde_json::from_str("\"created_at\"").unwrap();
        assert_eq!(camel, SortField::CreatedAt);
        assert_eq!(snake, SortField::CreatedAt);
    }
}
