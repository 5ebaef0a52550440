//! API error types

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] redrice_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] redrice_auth::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] redrice_storage::StorageError),
}

impl ApiError {
    /// Status code and client-facing message for this error
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Database(e) => match e {
                redrice_db::DbError::InvalidReference(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                redrice_db::DbError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
                _ => {
                    error!("Database error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
            },
            ApiError::Auth(e) => {
                if e.status_code().is_server_error() {
                    error!("Auth error: {}", e);
                }
                (e.status_code(), e.public_message().to_string())
            }
            ApiError::Storage(e) => match e {
                redrice_storage::StorageError::InvalidUpload(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                _ => {
                    error!("Storage error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error uploading image".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Error parsing form: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(ApiError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(redrice_auth::AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(ApiError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status(redrice_db::DbError::Duplicate("x".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(redrice_db::DbError::InvalidReference("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(redrice_auth::AuthError::InsufficientPermissions.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(redrice_auth::AuthError::TokenExpired.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(redrice_storage::StorageError::S3("boom".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(redrice_storage::StorageError::InvalidUpload("bad".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::NotFound("User 7 not found".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "User 7 not found" }));
    }
}
