/// Common test utilities for API integration tests
///
/// Each [`TestContext`] owns a fresh router over its own in-memory store, so
/// tests never share state and need no database.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::Config;
use taskdesk_shared::store::memory::MemoryStore;
use tower::Service as _;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Response status, headers, and JSON body (`Null` when empty)
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Test context containing the app under test
pub struct TestContext {
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", JWT_SECRET),
            ("PASSWORD_MEMORY_KIB", "1024"),
            ("PASSWORD_ITERATIONS", "1"),
            ("PASSWORD_PARALLELISM", "1"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config is valid");
        let state = AppState::with_store(MemoryStore::new(), None, config)
            .expect("test state is valid");

        Self {
            app: build_router(state),
        }
    }

    /// Sends a request, optionally authenticated and with a JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn signup(&self, username: &str, password: &str, nickname: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/users/signup",
            None,
            Some(serde_json::json!({
                "username": username,
                "password": password,
                "nickname": nickname,
            })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/users/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Signs up and logs in; returns (user id, access token, refresh token)
    pub async fn user(&self, username: &str) -> (i64, String, String) {
        let password = "password123";
        let signup = self.signup(username, password, &format!("{}-nick", username)).await;
        assert_eq!(signup.status, StatusCode::CREATED, "{}", signup.body);

        let login = self.login(username, password).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);

        (
            login.body["id"].as_i64().unwrap(),
            login.body["access_token"].as_str().unwrap().to_string(),
            login.body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a task and returns its JSON
    pub async fn create_task(&self, token: &str, title: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/v1/todos",
                Some(token),
                Some(serde_json::json!({ "title": title, "description": "" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}
