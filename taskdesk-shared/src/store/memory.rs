/// In-memory store backend
///
/// Keeps users and tasks in ordered maps behind a single `tokio::sync::RwLock`.
/// Ids are assigned from per-table counters starting at 1, mirroring a
/// PostgreSQL identity column. The whole state sits behind one lock, so
/// check-and-insert and compare-and-set are atomic here without transactions.
///
/// Intended for development (`STORAGE_BACKEND=memory`) and tests; nothing is
/// persisted.

use crate::error::{StoreError, StoreResult, UniqueField};
use crate::models::task::{NewTask, PageRequest, SortDirection, SortField, Task, TaskStatus};
use crate::models::user::{NewUser, User};
use crate::store::{TaskStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    tasks: BTreeMap<i64, Task>,
    last_user_id: i64,
    last_task_id: i64,
}

/// Process-local store implementing both [`UserStore`] and [`TaskStore`]
///
/// Cloning is cheap and clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_tasks(a: &Task, b: &Task, sort: SortField) -> Ordering {
    let primary = match sort {
        SortField::Id => Ordering::Equal,
        SortField::Title => a.title.cmp(&b.title),
        SortField::Status => a.status.cmp(&b.status),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation(UniqueField::Username));
        }
        if state.users.values().any(|u| u.nickname == user.nickname) {
            return Err(StoreError::UniqueViolation(UniqueField::Nickname));
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            username: user.username,
            password_hash: user.password_hash,
            nickname: user.nickname,
            created_at: user.created_at,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_nickname(&self, nickname: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.nickname == nickname).cloned())
    }

    async fn delete_with_tasks(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.tasks.retain(|_, task| task.user_id != id);

        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: NewTask) -> StoreResult<Task> {
        let mut state = self.state.write().await;

        if !state.users.contains_key(&task.user_id) {
            return Err(StoreError::MissingOwner(task.user_id));
        }

        state.last_task_id += 1;
        let task = Task {
            id: state.last_task_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        };
        state.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .get(&task_id)
            .filter(|task| task.user_id == owner_id)
            .cloned())
    }

    async fn list_owned(&self, owner_id: i64, page: &PageRequest) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;

        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect();

        tasks.sort_by(|a, b| {
            let ordering = compare_tasks(a, b, page.sort);
            match page.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(tasks.into_iter().skip(offset).take(limit).collect())
    }

    async fn most_recent(&self, owner_id: i64, limit: u32) -> StoreResult<Vec<Task>> {
        let state = self.state.read().await;

        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| compare_tasks(b, a, SortField::CreatedAt));
        tasks.truncate(limit as usize);

        Ok(tasks)
    }

    async fn compare_and_set_status(
        &self,
        owner_id: i64,
        task_id: i64,
        expected: TaskStatus,
        status: TaskStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Task>> {
        let mut state = self.state.write().await;

        match state.tasks.get_mut(&task_id) {
            Some(task) if task.user_id == owner_id && task.status == expected => {
                task.status = status;
                task.updated_at = updated_at;
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_owned(&self, owner_id: i64, task_id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;

        let owned = state
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.user_id == owner_id);
        if owned {
            state.tasks.remove(&task_id);
        }

        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(username: &str, nickname: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            nickname: nickname.to_string(),
            created_at: Utc::now(),
        }
    }

    fn new_task(user_id: i64, title: &str, at: DateTime<Utc>) -> NewTask {
        NewTask {
            user_id,
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let store = MemoryStore::new();
        let a = store.insert_user(new_user("a", "A")).await.unwrap();
        let b = store.insert_user(new_user("b", "B")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        store.insert_user(new_user("alice", "Al")).await.unwrap();

        assert!(matches!(
            store.insert_user(new_user("alice", "Other")).await,
            Err(StoreError::UniqueViolation(UniqueField::Username))
        ));
        assert!(matches!(
            store.insert_user(new_user("bob", "Al")).await,
            Err(StoreError::UniqueViolation(UniqueField::Nickname))
        ));
    }

    #[tokio::test]
    async fn test_insert_task_requires_owner() {
        let store = MemoryStore::new();
        let result = store.insert_task(new_task(9, "orphan", Utc::now())).await;

        assert!(matches!(result, Err(StoreError::MissingOwner(9))));
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice", "Al")).await.unwrap();
        let bob = store.insert_user(new_user("bob", "Bo")).await.unwrap();
        let task = store
            .insert_task(new_task(alice.id, "mine", Utc::now()))
            .await
            .unwrap();

        assert!(store.find_owned(bob.id, task.id).await.unwrap().is_none());
        assert!(!store.delete_owned(bob.id, task.id).await.unwrap());
        assert!(store
            .compare_and_set_status(bob.id, task.id, TaskStatus::Todo, TaskStatus::Done, Utc::now())
            .await
            .unwrap()
            .is_none());

        assert_eq!(store.find_owned(alice.id, task.id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn test_compare_and_set_requires_expected_status() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("alice", "Al")).await.unwrap();
        let task = store
            .insert_task(new_task(user.id, "t", Utc::now()))
            .await
            .unwrap();

        let stale = store
            .compare_and_set_status(user.id, task.id, TaskStatus::Done, TaskStatus::Todo, Utc::now())
            .await
            .unwrap();
        assert!(stale.is_none());

        let later = task.updated_at + Duration::seconds(5);
        let updated = store
            .compare_and_set_status(user.id, task.id, TaskStatus::Todo, TaskStatus::InProgress, later)
            .await
            .unwrap()
            .expect("status should match");
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_list_sorts_with_id_tiebreak_and_paginates() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("alice", "Al")).await.unwrap();
        let base = Utc::now();

        let t1 = store.insert_task(new_task(user.id, "b", base)).await.unwrap();
        let t2 = store.insert_task(new_task(user.id, "a", base)).await.unwrap();
        let t3 = store
            .insert_task(new_task(user.id, "c", base + Duration::seconds(1)))
            .await
            .unwrap();

        let newest = store
            .list_owned(user.id, &PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<i64> = newest.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t3.id, t2.id, t1.id]);

        let by_title = PageRequest {
            size: 2,
            sort: SortField::Title,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        let first: Vec<String> = store
            .list_owned(user.id, &by_title)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(first, vec!["a", "b"]);

        let second = PageRequest { page: 1, ..by_title };
        let rest = store.list_owned(user.id, &second).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, t3.id);

        let beyond = PageRequest { page: 5, ..by_title };
        assert!(store.list_owned(user.id, &beyond).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_tasks_cascades() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice", "Al")).await.unwrap();
        let bob = store.insert_user(new_user("bob", "Bo")).await.unwrap();
        let gone = store
            .insert_task(new_task(alice.id, "a", Utc::now()))
            .await
            .unwrap();
        let kept = store
            .insert_task(new_task(bob.id, "b", Utc::now()))
            .await
            .unwrap();

        assert!(store.delete_with_tasks(alice.id).await.unwrap());
        assert!(!store.delete_with_tasks(alice.id).await.unwrap());

        assert!(store.find_owned(alice.id, gone.id).await.unwrap().is_none());
        assert!(store.find_owned(bob.id, kept.id).await.unwrap().is_some());
        assert!(store.find_by_username("alice").await.unwrap().is_none());
    }
}
