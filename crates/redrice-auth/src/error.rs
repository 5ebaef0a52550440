//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::InvalidToken | AuthError::Jwt(_) => "Invalid token",
            AuthError::TokenExpired => "Token expired",
            AuthError::MissingAuthHeader => "Missing authorization header",
            AuthError::InvalidAuthHeader => "Invalid authorization header format",
            AuthError::InsufficientPermissions => "Insufficient permissions",
            AuthError::PasswordHash(_) => "Internal error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "error": self.public_message()
        }));

        (self.status_code(), body).into_response()
    }
}
