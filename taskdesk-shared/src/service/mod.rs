/// Business services
///
/// - [`account::AccountService`]: signup, login, withdraw
/// - [`task::TaskService`]: owner-scoped task CRUD and status transitions
///
/// Services are composed explicitly from their stores and are cheap to clone,
/// so the API layer keeps one of each in its shared state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::auth::password::{HashParams, PasswordHasher};
/// use taskdesk_shared::service::{account::AccountService, task::TaskService};
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let hasher = PasswordHasher::new(HashParams::default())?;
///
/// let accounts = AccountService::new(Arc::new(store.clone()), hasher);
/// let tasks = TaskService::new(Arc::new(store.clone()), Arc::new(store));
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod task;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at microsecond precision, the resolution PostgreSQL stores
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
