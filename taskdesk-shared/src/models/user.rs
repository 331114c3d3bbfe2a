/// User model and database operations
///
/// This module provides the User model and the PostgreSQL queries behind the
/// credential store. Users own tasks; deleting a user deletes its tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
///     username VARCHAR(50) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     nickname VARCHAR(50) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL,
///     CONSTRAINT users_username_key UNIQUE (username),
///     CONSTRAINT users_nickname_key UNIQUE (nickname)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{NewUser, User};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     nickname: "Al".to_string(),
///     created_at: chrono::Utc::now(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "alice").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Unique constraint guarding `users.username`
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Unique constraint guarding `users.nickname`
pub const NICKNAME_CONSTRAINT: &str = "users_nickname_key";

/// User model representing an account
///
/// Passwords are stored as Argon2id PHC strings, never in plaintext. This type
/// is intentionally not `Serialize`; use [`UserSummary`] on the wire.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    /// Server-generated user ID
    pub id: i64,

    /// Login name, unique and immutable
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Display name, unique
    pub nickname: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("nickname", &self.nickname)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name
    pub username: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Display name
    pub nickname: String,

    /// Creation timestamp, stamped by the account service
    pub created_at: DateTime<Utc>,
}

/// Public view of a user: never carries the password or its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub nickname: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
        }
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username or nickname already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, nickname, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, nickname, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.nickname)
        .bind(data.created_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, nickname, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, nickname, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by nickname (exact match)
    pub async fn find_by_nickname(
        pool: &PgPool,
        nickname: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, nickname, created_at
            FROM users
            WHERE nickname = $1
            "#,
        )
        .bind(nickname)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user and every task it owns in one transaction
    ///
    /// ⚠️  **WARNING**: This permanently deletes the account and its tasks.
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete_with_tasks(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tasks = sqlx::query("DELETE FROM tasks WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if users.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;

        tracing::debug!(
            user_id = id,
            tasks_deleted = tasks.rows_affected(),
            "User deleted with owned tasks"
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 42,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            nickname: "Al".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_excludes_password_hash() {
        let summary = UserSummary::from(&sample_user());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["id"], 42);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["nickname"], "Al");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let debug = format!("{:?}", sample_user());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }
}
