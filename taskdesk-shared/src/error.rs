/// Error types for the store and service layers
///
/// Stores report [`StoreError`]; services translate it into the business-level
/// [`ServiceError`] taxonomy that the API layer maps onto HTTP responses.
///
/// # Example
///
/// ```
/// use taskdesk_shared::error::ServiceError;
///
/// let err = ServiceError::DuplicateUsername;
/// assert_eq!(err.to_string(), "username already exists");
/// ```

use crate::auth::password::PasswordError;
use crate::models::task::TaskStatus;
use std::fmt;

/// Message shared by every failed login, whatever the cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid username or password";

/// Column guarded by a uniqueness constraint on the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Nickname,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Nickname => write!(f, "nickname"),
        }
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("unique constraint violated on {0}")]
    UniqueViolation(UniqueField),

    /// The owning user vanished before the write landed
    #[error("owning user {0} does not exist")]
    MissingOwner(i64),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Business errors surfaced by the account and task services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Another user already holds this username
    #[error("username already exists")]
    DuplicateUsername,

    /// Another user already holds this nickname
    #[error("nickname already exists")]
    DuplicateNickname,

    /// Unknown username or wrong password (deliberately indistinguishable)
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No user with this id
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// No task with this id owned by the caller
    #[error("task {0} not found")]
    TaskNotFound(i64),

    /// Only IN_PROGRESS tasks may move to PENDING
    #[error("cannot move task from {from} to {to}: only IN_PROGRESS tasks can become PENDING")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Storage failure (not retried)
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Password hashing infrastructure failure
    #[error("password processing failed: {0}")]
    Password(#[from] PasswordError),
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
