/// PostgreSQL store backend
///
/// Thin adapter from the store traits onto the model queries in
/// [`crate::models`]. Its main job is translating constraint violations into
/// [`StoreError`] variants the services understand.

use crate::error::{StoreError, StoreResult, UniqueField};
use crate::models::task::{NewTask, PageRequest, Task, TaskStatus};
use crate::models::user::{NewUser, User, NICKNAME_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::store::{TaskStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool (for health checks and shutdown)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique-constraint violation on `users` to the column it guards
fn map_user_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => {
                    return StoreError::UniqueViolation(UniqueField::Username)
                }
                Some(NICKNAME_CONSTRAINT) => {
                    return StoreError::UniqueViolation(UniqueField::Nickname)
                }
                _ => {}
            }
        }
    }
    StoreError::Database(err)
}

fn map_task_insert_error(err: sqlx::Error, owner_id: i64) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StoreError::MissingOwner(owner_id)
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        User::create(&self.pool, user)
            .await
            .map_err(map_user_insert_error)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn find_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_nickname(&self.pool, nickname).await?)
    }

    async fn delete_with_tasks(&self, id: i64) -> StoreResult<bool> {
        Ok(User::delete_with_tasks(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        let owner_id = task.user_id;
        Task::create(&self.pool, task)
            .await
            .map_err(|e| map_task_insert_error(e, owner_id))
    }

    async fn find_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id_and_user(&self.pool, task_id, owner_id).await?)
    }

    async fn list_owned(&self, owner_id: i64, page: &PageRequest) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_user(&self.pool, owner_id, page).await?)
    }

    async fn most_recent(&self, owner_id: i64, limit: u32) -> StoreResult<Vec<Task>> {
        Ok(Task::most_recent(&self.pool, owner_id, i64::from(limit)).await?)
    }

    async fn compare_and_set_status(
        &self,
        owner_id: i64,
        task_id: i64,
        expected: TaskStatus,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update_status(&self.pool, task_id, owner_id, expected, status, updated_at).await?)
    }

    async fn delete_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<bool> {
        Ok(Task::delete_by_id_and_user(&self.pool, task_id, owner_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        assert!(matches!(
            map_user_insert_error(sqlx::Error::RowNotFound),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
        assert!(matches!(
            map_task_insert_error(sqlx::Error::PoolTimedOut, 5),
            StoreError::Database(sqlx::Error::PoolTimedOut)
        ));
    }
}
