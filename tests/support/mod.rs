#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use marketplace_api::{
    app::{build_router, build_state},
    config::{AppEnv, Config},
    repos::memory::MemoryRepos,
    services::auth::{Principal, Role, SigningKey, TokenService},
};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: None,
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        jwt_secret: SigningKey::new(SECRET).unwrap(),
        token_ttl_seconds: 3600,
        db_max_connections: 1,
        db_acquire_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
    }
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

/// Full router over in-memory repositories.
pub struct TestApp {
    pub router: Router,
    pub repos: MemoryRepos,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let repos = MemoryRepos::new();
        let state = build_state(&config, repos.repositories());
        let tokens = state.auth.clone();
        let router = build_router(state, &config);
        Self {
            router,
            repos,
            tokens,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    /// Token for an identity that has no stored user record.
    pub fn token_for(&self, username: &str, role: Role) -> (Principal, String) {
        let principal = Principal::new(Uuid::new_v4(), username, role).unwrap();
        let token = self.tokens.issue(&principal).unwrap();
        (principal, token)
    }

    /// Register through the API, then log in. Returns the issued token.
    pub async fn register_and_login(&self, username: &str, role: &str) -> String {
        let res = self
            .call(
                Method::POST,
                "/api/v1/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password-123",
                    "role": role,
                    "phone": "+628123456789",
                    "name": username,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);

        let res = self
            .call(
                Method::POST,
                "/api/v1/login",
                None,
                Some(serde_json::json!({"username": username, "password": "password-123"})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }
}

pub fn error_code(res: &Response) -> &str {
    res.body["error"]["code"].as_str().unwrap_or_default()
}
