/// Database models for TaskDesk
///
/// This module contains the domain models and their PostgreSQL queries.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `task`: Owner-scoped to-do items, status rules, and pagination input
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{PageRequest, Task};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let tasks = Task::list_by_user(&pool, 1, &PageRequest::default()).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
