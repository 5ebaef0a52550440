//! Request extractors and parsing helpers

use axum::extract::FromRequest;
use std::str::FromStr;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a path id, which must be a positive integer
pub fn parse_id(raw: &str, entity: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!("Invalid {} id", entity))),
    }
}

/// Treat blank strings as "not provided"
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Require a non-blank field
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    non_empty(value).ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

/// Parse an optional numeric form value; blank means absent
pub fn parse_optional<T: FromStr>(raw: &str, field: &str) -> Result<Option<T>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}", field)))
}
