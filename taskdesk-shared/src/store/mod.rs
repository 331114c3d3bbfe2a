/// Credential and task stores
///
/// The services only talk to storage through the [`UserStore`] and
/// [`TaskStore`] traits, so the same business logic runs against PostgreSQL in
/// production and against the in-memory backend in development and tests.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx + PostgreSQL, delegating to the model queries
/// - [`memory::MemoryStore`]: process-local maps behind a `tokio::sync::RwLock`
///
/// Both backends implement both traits on one value, because withdrawing a user
/// must remove the user and its tasks atomically.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::store::{memory::MemoryStore, TaskStore, UserStore};
///
/// let store = MemoryStore::new();
/// let users: Arc<dyn UserStore> = Arc::new(store.clone());
/// let tasks: Arc<dyn TaskStore> = Arc::new(store);
/// ```

pub mod memory;
pub mod postgres;

use crate::error::StoreResult;
use crate::models::task::{NewTask, PageRequest, Task, TaskStatus};
use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user, returning it with its generated id
    ///
    /// # Errors
    ///
    /// `StoreError::UniqueViolation` if the username or nickname is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn find_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>>;

    /// Deletes a user and all of its tasks atomically
    ///
    /// Returns false if the user did not exist.
    async fn delete_with_tasks(&self, id: i64) -> StoreResult<bool>;
}

/// Persistence for tasks, always scoped to an owning user
///
/// Every lookup or write takes the owner id alongside the task id; a task that
/// exists under another owner is indistinguishable from a missing one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task, returning it with its generated id
    ///
    /// # Errors
    ///
    /// `StoreError::MissingOwner` if the owning user does not exist
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task>;

    async fn find_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>>;

    /// One page of the owner's tasks in the requested order
    async fn list_owned(&self, owner_id: i64, page: &PageRequest) -> StoreResult<Vec<Task>>;

    /// Up to `limit` newest tasks, newest first, highest id first on ties
    async fn most_recent(&self, owner_id: i64, limit: u32) -> StoreResult<Vec<Task>>;

    /// Sets `status` only if the task is still owned by `owner_id` and still
    /// in status `expected`
    ///
    /// Returns None when no task matched all three conditions.
    async fn compare_and_set_status(
        &self,
        owner_id: i64,
        task_id: i64,
        expected: TaskStatus,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>>;

    /// Returns false if no task with this id is owned by `owner_id`
    async fn delete_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<bool>;
}
