/// Task endpoints
///
/// All routes require a valid access token; the token's user is the owner for
/// every operation. Tasks owned by other users answer `404` exactly like
/// missing ones.
///
/// # Endpoints
///
/// - `POST /v1/todos` - Create a task
/// - `GET /v1/todos?page&size&sort&order` - List tasks
/// - `GET /v1/todos/recent?limit` - Newest tasks
/// - `GET /v1/todos/:id` - Get one task
/// - `PUT /v1/todos/:id/status` - Change status
/// - `DELETE /v1/todos/:id` - Delete a task

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ValidatedJson, ValidatedQuery},
    middleware::auth::AuthContext,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskdesk_shared::models::task::{
    PageRequest, SortDirection, SortField, Task, TaskStatus, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Missing and `null` both mean empty
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
}

/// Query parameters for listing tasks
///
/// `page` is zero-based. `sort` is one of `id`, `title`, `status`,
/// `createdAt` (default), `updatedAt`; `order` is `asc` or `desc` (default).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListTasksQuery {
    pub page: Option<u32>,

    #[validate(range(min = 1, max = 100, message = "Size must be between 1 and 100"))]
    pub size: Option<u32>,

    pub sort: Option<SortField>,

    pub order: Option<SortDirection>,
}

impl From<ListTasksQuery> for PageRequest {
    fn from(query: ListTasksQuery) -> Self {
        PageRequest {
            page: query.page.unwrap_or(0),
            size: query.size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
            sort: query.sort.unwrap_or_default(),
            direction: query.order.unwrap_or_default(),
        }
    }
}

/// Query parameters for the newest tasks
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RecentTasksQuery {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<u32>,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// `TODO`, `IN_PROGRESS`, `DONE`, or `PENDING`
    pub status: TaskStatus,
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/todos
/// Authorization: Bearer <access token>
///
/// { "title": "Buy milk", "description": "Two litres" }
/// ```
///
/// Returns `201 Created` with the task (status `TODO`).
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state
        .tasks
        .create(
            auth.user_id,
            &req.title,
            req.description.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks, one page at a time
///
/// Pages past the end return `[]`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list(auth.user_id, query.into()).await?;

    Ok(Json(tasks))
}

/// The caller's newest tasks (`limit` defaults to 1), newest first
///
/// Returns `[]` when the caller has no tasks.
pub async fn recent_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedQuery(query): ValidatedQuery<RecentTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .tasks
        .get_most_recent(auth.user_id, query.limit)
        .await?;

    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get_one(auth.user_id, id).await?))
}

/// Change a task's status
///
/// # Errors
///
/// - `404 Not Found`: No such task for this user
/// - `422 Unprocessable Entity`: Moving to `PENDING` from anything but
///   `IN_PROGRESS`
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = state
        .tasks
        .update_status(auth.user_id, id, req.status)
        .await?;

    Ok(Json(task))
}

/// Delete a task; returns `204 No Content`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
