/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdesk_api::{app::{build_router, AppState}, config::Config};
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::with_store(MemoryStore::new(), None, config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdesk_shared::{
    auth::password::PasswordHasher,
    service::{account::AccountService, task::TaskService},
    store::{TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Signup, login, withdraw
    pub accounts: AccountService,

    /// Owner-scoped task operations
    pub tasks: TaskService,

    /// Database connection pool (None with the in-memory backend)
    pub db: Option<PgPool>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires both services onto one store
    ///
    /// # Errors
    ///
    /// Returns an error if the configured password hashing cost is invalid
    pub fn with_store<S>(store: S, db: Option<PgPool>, config: Config) -> anyhow::Result<Self>
    where
        S: UserStore + TaskStore + Clone + 'static,
    {
        let hasher = PasswordHasher::new(config.password.into())?;
        let users: Arc<dyn UserStore> = Arc::new(store.clone());
        let tasks: Arc<dyn TaskStore> = Arc::new(store);

        Ok(Self {
            accounts: AccountService::new(users.clone(), hasher),
            tasks: TaskService::new(users, tasks),
            db,
            config: Arc::new(config),
        })
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                      # Health check (public)
/// └── /v1/
///     ├── /users/
///     │   ├── POST   /signup       # public
///     │   ├── POST   /login        # public
///     │   ├── POST   /refresh      # public (refresh token in body)
///     │   └── DELETE /me           # withdraw (authenticated)
///     └── /todos/                  # all authenticated
///         ├── POST   /
///         ├── GET    /             # ?page&size&sort&order
///         ├── GET    /recent       # ?limit
///         ├── GET    /:id
///         ├── PUT    /:id/status
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_user_routes = Router::new()
        .route("/signup", post(routes::users::signup))
        .route("/login", post(routes::users::login))
        .route("/refresh", post(routes::users::refresh));

    let account_routes = Router::new()
        .route("/me", delete(routes::users::withdraw))
        .layer(auth.clone());

    let todo_routes = Router::new()
        .route(
            "/",
            post(routes::todos::create_task).get(routes::todos::list_tasks),
        )
        .route("/recent", get(routes::todos::recent_tasks))
        .route(
            "/:id",
            get(routes::todos::get_task).delete(routes::todos::delete_task),
        )
        .route("/:id/status", put(routes::todos::update_task_status))
        .layer(auth);

    let v1_routes = Router::new()
        .nest("/users", public_user_routes.merge(account_routes))
        .nest("/todos", todo_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
