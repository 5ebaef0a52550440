//! Shared fixtures for router tests

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use bytes::Bytes;
use redrice_auth::{JwtManager, hash_password};
use redrice_db::{Database, NewUser, User, UserRole};
use redrice_storage::{ImageStore, StorageError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "password-123";

/// Image store double that records uploads instead of storing them
#[derive(Default)]
pub struct RecordingImageStore {
    pub uploads: Mutex<Vec<(String, usize)>>,
    pub fail: bool,
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn upload(&self, data: Bytes, filename: &str) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::S3("bucket unavailable".to_string()));
        }
        // Reject the same uploads the real stores do
        redrice_storage::backend::image_key(&data, filename)?;
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((filename.to_string(), data.len()));
        Ok(format!("https://images.test/{}/{}", uploads.len(), filename))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub images: Arc<RecordingImageStore>,
    app: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_images(RecordingImageStore::default()).await
    }

    pub async fn with_images(images: RecordingImageStore) -> Self {
        let db = Database::in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new("test-secret", 24));
        let images = Arc::new(images);
        let state = AppState::new(db, jwt, images.clone());
        let app = create_router(state.clone(), None);
        Self { state, images, app }
    }

    /// Insert a user with the given role and return it with a valid token
    pub async fn user_with_role(&self, email: &str, role: UserRole) -> (User, String) {
        let user = self
            .state
            .db
            .insert_user(NewUser {
                name: email.split('@').next().unwrap_or("user").to_string(),
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
                telephone: "0800000000".to_string(),
                role,
            })
            .await
            .unwrap();
        let token = self.state.jwt.generate_token(user.id, user.role).unwrap();
        (user, token)
    }

    pub async fn user(&self, email: &str) -> (User, String) {
        self.user_with_role(email, UserRole::User).await
    }

    pub async fn admin_token(&self) -> String {
        self.user_with_role("admin@example.com", UserRole::Admin).await.1
    }

    /// Send a request with an optional JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        json: Option<Value>,
    ) -> (StatusCode, Value) {
        match json {
            Some(value) => {
                self.send_raw(
                    method,
                    uri,
                    token,
                    "application/json",
                    serde_json::to_vec(&value).unwrap(),
                )
                .await
            }
            None => self.dispatch(method, uri, token, None, Body::empty()).await,
        }
    }

    /// Send a request with an arbitrary body
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        self.dispatch(method, uri, token, Some(content_type), Body::from(body))
            .await
    }

    async fn dispatch(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: Body,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

/// Build a multipart/form-data body; returns (content type, body)
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "redrice-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((field, filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}
