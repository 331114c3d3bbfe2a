/// Account service: signup, login, and withdrawal
///
/// # Login
///
/// An unknown username and a wrong password produce the same
/// [`ServiceError::InvalidCredentials`]. Unknown usernames are still verified
/// against a throwaway hash so both paths cost one Argon2 verification.
///
/// Hashing and verification are CPU-bound and run on tokio's blocking pool.

use crate::auth::password::{verify_password, PasswordError, PasswordHasher};
use crate::error::{ServiceError, ServiceResult, StoreError, UniqueField};
use crate::models::user::{NewUser, UserSummary};
use crate::service::now;
use crate::store::UserStore;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Verified against when the username is unknown
const DUMMY_PASSWORD: &str = "taskdesk-dummy-password";

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    dummy_hash: Arc<OnceCell<String>>,
}

async fn hash_blocking(hasher: PasswordHasher, password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))?
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Registers a new user
    ///
    /// Username is checked before nickname, so a request clashing on both
    /// reports the username.
    ///
    /// # Errors
    ///
    /// - `DuplicateUsername` / `DuplicateNickname` if either is taken
    /// - `Password` if hashing fails
    /// - `Storage` on any other store failure
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
    ) -> ServiceResult<UserSummary> {
        if self.users.find_by_username(username).await?.is_some() {
            debug!(username, "Signup rejected: username taken");
            return Err(ServiceError::DuplicateUsername);
        }
        if self.users.find_by_nickname(nickname).await?.is_some() {
            debug!(nickname, "Signup rejected: nickname taken");
            return Err(ServiceError::DuplicateNickname);
        }

        let password_hash = hash_blocking(self.hasher.clone(), password.to_string()).await?;

        let user = self
            .users
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
                nickname: nickname.to_string(),
                created_at: now(),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent signup
                StoreError::UniqueViolation(UniqueField::Username) => {
                    ServiceError::DuplicateUsername
                }
                StoreError::UniqueViolation(UniqueField::Nickname) => {
                    ServiceError::DuplicateNickname
                }
                other => ServiceError::Storage(other),
            })?;

        info!(user_id = user.id, username = %user.username, "User signed up");

        Ok(UserSummary::from(&user))
    }

    /// Authenticates a user by username and password
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown username or a wrong password
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<UserSummary> {
        let user = self.users.find_by_username(username).await?;

        let hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?,
        };
        let matches = verify_blocking(password.to_string(), hash).await?;

        match user {
            Some(user) if matches => {
                debug!(user_id = user.id, "User logged in");
                Ok(UserSummary::from(&user))
            }
            _ => {
                warn!(username, "Login failed");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    /// Deletes a user together with every task it owns
    ///
    /// # Errors
    ///
    /// `UserNotFound` if no user has this id
    pub async fn withdraw(&self, user_id: i64) -> ServiceResult<()> {
        if !self.users.delete_with_tasks(user_id).await? {
            return Err(ServiceError::UserNotFound(user_id));
        }

        info!(user_id, "User withdrawn");
        Ok(())
    }

    /// Looks up the public view of a user
    ///
    /// # Errors
    ///
    /// `UserNotFound` if no user has this id
    pub async fn find_user(&self, user_id: i64) -> ServiceResult<UserSummary> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| UserSummary::from(&user))
            .ok_or(ServiceError::UserNotFound(user_id))
    }

    async fn dummy_hash(&self) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        self.dummy_hash
            .get_or_try_init(|| hash_blocking(hasher, DUMMY_PASSWORD.to_string()))
            .await
            .cloned()
    }
}
