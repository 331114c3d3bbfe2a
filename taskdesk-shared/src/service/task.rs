/// Task service: owner-scoped CRUD and status transitions
///
/// Every operation takes the caller's user id. A task owned by someone else is
/// reported exactly like a missing one ([`ServiceError::TaskNotFound`]).
///
/// # Status updates
///
/// The PENDING rule is checked against the task as read, and the write only
/// lands if the stored status still equals what was checked. If another request
/// changed the status in between, the task is re-read and the rule re-evaluated.

use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::models::task::{NewTask, PageRequest, Task, TaskStatus, MAX_PAGE_SIZE};
use crate::service::now;
use crate::store::{TaskStore, UserStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of tasks returned by [`TaskService::get_most_recent`] without a limit
pub const DEFAULT_RECENT_LIMIT: u32 = 1;

#[derive(Clone)]
pub struct TaskService {
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { users, tasks }
    }

    /// Creates a TODO task for `owner_id`
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the owner doesn't exist
    pub async fn create(
        &self,
        owner_id: i64,
        title: &str,
        description: &str,
    ) -> ServiceResult<Task> {
        if self.users.find_by_id(owner_id).await?.is_none() {
            return Err(ServiceError::UserNotFound(owner_id));
        }

        let timestamp = now();
        let task = self
            .tasks
            .insert_task(NewTask {
                user_id: owner_id,
                title: title.to_string(),
                description: description.to_string(),
                status: TaskStatus::Todo,
                created_at: timestamp,
                updated_at: timestamp,
            })
            .await
            .map_err(|e| match e {
                // Owner withdrew between the check and the insert
                StoreError::MissingOwner(id) => ServiceError::UserNotFound(id),
                other => ServiceError::Storage(other),
            })?;

        info!(user_id = owner_id, task_id = task.id, "Task created");

        Ok(task)
    }

    /// Lists one page of the owner's tasks
    ///
    /// Page size is clamped to `1..=MAX_PAGE_SIZE`. Pages past the end are
    /// empty, not an error.
    pub async fn list(&self, owner_id: i64, page: PageRequest) -> ServiceResult<Vec<Task>> {
        let page = PageRequest {
            size: page.size.clamp(1, MAX_PAGE_SIZE),
            ..page
        };

        let tasks = self.tasks.list_owned(owner_id, &page).await?;
        debug!(user_id = owner_id, page = page.page, count = tasks.len(), "Listed tasks");

        Ok(tasks)
    }

    /// Fetches a single task owned by `owner_id`
    ///
    /// # Errors
    ///
    /// `TaskNotFound` if it doesn't exist or belongs to another user
    pub async fn get_one(&self, owner_id: i64, task_id: i64) -> ServiceResult<Task> {
        self.tasks
            .find_owned(owner_id, task_id)
            .await?
            .ok_or(ServiceError::TaskNotFound(task_id))
    }

    /// Returns the owner's newest tasks, newest first
    ///
    /// `limit` defaults to [`DEFAULT_RECENT_LIMIT`] and is clamped to
    /// `1..=MAX_PAGE_SIZE`. Tasks created at the same instant are ordered by
    /// descending id. An owner with no tasks gets an empty list.
    pub async fn get_most_recent(
        &self,
        owner_id: i64,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Task>> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .clamp(1, MAX_PAGE_SIZE);

        Ok(self.tasks.most_recent(owner_id, limit).await?)
    }

    /// Moves a task to `status`
    ///
    /// # Errors
    ///
    /// - `TaskNotFound` if it doesn't exist or belongs to another user
    /// - `InvalidTransition` if `status` is PENDING and the task is not
    ///   IN_PROGRESS
    pub async fn update_status(
        &self,
        owner_id: i64,
        task_id: i64,
        status: TaskStatus,
    ) -> ServiceResult<Task> {
        loop {
            let current = self.get_one(owner_id, task_id).await?;

            if !current.status.can_transition_to(status) {
                warn!(
                    user_id = owner_id,
                    task_id,
                    from = %current.status,
                    to = %status,
                    "Rejected status transition"
                );
                return Err(ServiceError::InvalidTransition {
                    from: current.status,
                    to: status,
                });
            }

            let updated = self
                .tasks
                .compare_and_set_status(owner_id, task_id, current.status, status, now())
                .await?;

            match updated {
                Some(task) => {
                    info!(user_id = owner_id, task_id, status = %task.status, "Task status updated");
                    return Ok(task);
                }
                None => {
                    debug!(task_id, "Task changed concurrently, re-reading");
                }
            }
        }
    }

    /// Deletes a task owned by `owner_id`
    ///
    /// # Errors
    ///
    /// `TaskNotFound` if it doesn't exist or belongs to another user
    pub async fn delete(&self, owner_id: i64, task_id: i64) -> ServiceResult<()> {
        if !self.tasks.delete_owned(owner_id, task_id).await? {
            return Err(ServiceError::TaskNotFound(task_id));
        }

        info!(user_id = owner_id, task_id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use crate::store::memory::MemoryStore;

    async fn setup() -> (TaskService, i64) {
        let store = MemoryStore::new();
        let user = store
            .insert_user(NewUser {
                username: "alice".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                nickname: "Al".to_string(),
                created_at: now(),
            })
            .await
            .unwrap();

        (
            TaskService::new(Arc::new(store.clone()), Arc::new(store)),
            user.id,
        )
    }

    #[tokio::test]
    async fn test_create_requires_existing_owner() {
        let (tasks, owner) = setup().await;

        assert!(matches!(
            tasks.create(owner + 100, "t", "").await,
            Err(ServiceError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_racing_withdrawal_is_user_not_found() {
        let users = MemoryStore::new();
        let owner = users
            .insert_user(NewUser {
                username: "alice".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                nickname: "Al".to_string(),
                created_at: now(),
            })
            .await
            .unwrap();

        // The owner check passes, but the task store no longer has the owner
        let tasks = TaskService::new(Arc::new(users), Arc::new(MemoryStore::new()));

        assert!(matches!(
            tasks.create(owner.id, "t", "").await,
            Err(ServiceError::UserNotFound(id)) if id == owner.id
        ));
    }

    #[tokio::test]
    async fn test_new_task_timestamps_match() {
        let (tasks, owner) = setup().await;
        let task = tasks.create(owner, "write report", "quarterly").await.unwrap();

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.description, "quarterly");
    }

    #[tokio::test]
    async fn test_status_update_keeps_created_at() {
        let (tasks, owner) = setup().await;
        let task = tasks.create(owner, "t", "").await.unwrap();

        let updated = tasks
            .update_status(owner, task.id, TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_recent_limit_defaults_to_one() {
        let (tasks, owner) = setup().await;
        assert!(tasks.get_most_recent(owner, None).await.unwrap().is_empty());

        tasks.create(owner, "a", "").await.unwrap();
        tasks.create(owner, "b", "").await.unwrap();

        assert_eq!(tasks.get_most_recent(owner, None).await.unwrap().len(), 1);
        assert_eq!(tasks.get_most_recent(owner, Some(5)).await.unwrap().len(), 2);
        assert_eq!(tasks.get_most_recent(owner, Some(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_clamps_page_size() {
        let (tasks, owner) = setup().await;
        tasks.create(owner, "a", "").await.unwrap();
        tasks.create(owner, "b", "").await.unwrap();

        let zero = PageRequest {
            size: 0,
            ..Default::default()
        };
        assert_eq!(tasks.list(owner, zero).await.unwrap().len(), 1);
    }
}
