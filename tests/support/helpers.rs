use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt as _;

use conduit::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    state::AppState,
};

use super::mocks::{MemoryArticleStore, MemoryCommentStore, MemoryUserStore};

pub struct TestApp {
    pub router: Router,
    pub config: Arc<AppConfig>,
    pub users: Arc<MemoryUserStore>,
    pub articles: Arc<MemoryArticleStore>,
    pub comments: Arc<MemoryCommentStore>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60 * 24,
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_users(MemoryUserStore::default())
}

pub fn spawn_app_with_users(users: MemoryUserStore) -> TestApp {
    let config = Arc::new(test_config());
    let users = Arc::new(users);
    let articles = Arc::new(MemoryArticleStore::default());
    let comments = Arc::new(MemoryCommentStore::default());
    let state = AppState::from_parts(
        config.clone(),
        users.clone(),
        articles.clone(),
        comments.clone(),
    );
    TestApp {
        router: build_app(state),
        config,
        users,
        articles,
        comments,
    }
}

impl TestApp {
    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"user": {"username": username, "email": email, "password": password}})),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"user": {"email": email, "password": password}})),
        )
        .await
    }

    /// Registers a user and returns a fresh token for it.
    pub async fn signed_in(&self, username: &str) -> String {
        let email = format!("{username}@conduit.test");
        let (status, _) = self.register(username, &email, "password123").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self.login(&email, "password123").await;
        assert_eq!(status, StatusCode::OK);
        body["user"]["token"].as_str().unwrap().to_owned()
    }
}

pub fn error_messages(body: &Value) -> Vec<String> {
    body["errors"]["body"]
        .as_array()
        .unwrap_or_else(|| panic!("expected error envelope, got {body}"))
        .iter()
        .map(|v| v.as_str().unwrap().to_owned())
        .collect()
}
