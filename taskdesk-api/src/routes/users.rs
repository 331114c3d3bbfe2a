/// Account endpoints
///
/// - `POST /v1/users/signup` - Register a new user
/// - `POST /v1/users/login` - Login and get tokens
/// - `POST /v1/users/refresh` - Exchange a refresh token for an access token
/// - `DELETE /v1/users/me` - Withdraw (delete the account and all its tasks)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    middleware::auth::AuthContext,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::jwt::{self, Claims, TokenType},
    error::ServiceError,
    models::user::UserSummary,
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Login name
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    /// Display name
    #[validate(length(min = 1, max = 50, message = "Nickname must be 1-50 characters"))]
    pub nickname: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The authenticated user
    #[serde(flatten)]
    pub user: UserSummary,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/signup
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "correct horse battery",
///   "nickname": "Al"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "id": 1, "username": "alice", "nickname": "Al" }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username or nickname already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    let user = state
        .accounts
        .signup(&req.username, &req.password, &req.nickname)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// # Response
///
/// ```json
/// {
///   "id": 1,
///   "username": "alice",
///   "nickname": "Al",
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid username or password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.accounts.login(&req.username, &req.password).await?;

    let access_token = jwt::create_token(&Claims::new(user.id, TokenType::Access), state.jwt_secret())?;
    let refresh_token =
        jwt::create_token(&Claims::new(user.id, TokenType::Refresh), state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user,
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or the account was
///   withdrawn
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    state
        .accounts
        .find_user(claims.sub)
        .await
        .map_err(|e| match e {
            ServiceError::UserNotFound(_) => {
                ApiError::Unauthorized("Account no longer exists".to_string())
            }
            other => other.into(),
        })?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Withdraw the authenticated user
///
/// Deletes the account and every task it owns. Returns `204 No Content`.
///
/// # Errors
///
/// - `404 Not Found`: The account was already withdrawn
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    state.accounts.withdraw(auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
