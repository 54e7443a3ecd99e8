//! Common test utilities for API tests
//!
//! Builds the full router over a `MemoryStore` and a temporary image
//! directory, and offers small helpers for driving it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::storage::LocalImageStore;
use taskboard_shared::store::{MemoryStore, Store};
use tempfile::TempDir;
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "taskboard-test-boundary";

/// Test context containing the router and its backing resources
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub images: TempDir,
}

/// A registered, logged-in user
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl TestContext {
    pub fn new() -> Self {
        let images = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let config = Config::for_tests(images.path());

        let state = AppState::new(
            store.clone() as Arc<dyn Store>,
            Arc::new(LocalImageStore::new(images.path())),
            config,
        )
        .unwrap();

        Self {
            app: build_router(state),
            store,
            images,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// JSON request, optionally authenticated
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&TestUser>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = token {
            builder = builder.header(header::AUTHORIZATION, user.auth_header());
        }

        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.json(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.json(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> (StatusCode, Value) {
        self.json(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.json(Method::DELETE, uri, Some(user), None).await
    }

    pub async fn register(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
        });
        self.json(Method::POST, "/auth/register-user", None, Some(body))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login-user")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}&password={}",
                username, password
            )))
            .unwrap();

        self.send(request).await
    }

    /// Registers and logs in a user, panicking on any failure
    pub async fn signup(&self, username: &str) -> TestUser {
        let (status, _) = self.register(username, "p1").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self.login(username, "p1").await;
        assert_eq!(status, StatusCode::ACCEPTED);

        TestUser {
            id: body["user"]["id"].as_i64().unwrap(),
            username: username.to_string(),
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a project and returns its id
    pub async fn create_project(&self, user: &TestUser, name: &str) -> i64 {
        let (status, body) = self
            .post("/project/create", user, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    /// Creates a task in `project_id` and returns its id
    pub async fn create_task(&self, user: &TestUser, title: &str, project_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/tasks/create-task",
                user,
                serde_json::json!({
                    "title": title,
                    "deadline": "2030-01-01T00:00:00Z",
                    "project_id": project_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    /// Creates a comment on `task_id` and returns its id
    pub async fn create_comment(&self, user: &TestUser, content: &str, task_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/comment/creat-comment/",
                user,
                serde_json::json!({ "content": content, "task_id": task_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }
}

/// One part of a multipart body
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Encodes `parts` as a `multipart/form-data` body using [`MULTIPART_BOUNDARY`]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Builds an authenticated `PUT /user/edit/` request
pub fn edit_profile_request(user: &TestUser, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri("/user/edit/")
        .header(header::AUTHORIZATION, user.auth_header())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}
