//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use redrice_db::UserRole;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::capability::Capability;
use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        Ok(Self {
            id: claims.user_id()?,
            role: claims.user_role()?,
        })
    }

    /// Whether this user holds the capability
    pub fn can(&self, capability: Capability) -> bool {
        capability.granted_to(self.id, self.role)
    }

    /// Fail with `InsufficientPermissions` unless this user holds the capability
    pub fn require(&self, capability: Capability) -> Result<(), AuthError> {
        if self.can(capability) {
            Ok(())
        } else {
            debug!("User {} denied {:?}", self.id, capability);
            Err(AuthError::InsufficientPermissions)
        }
    }
}

/// Handlers behind [`auth_middleware`] take `AuthUser` as an argument
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Extract bearer token from authorization header
///
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = match header.trim_start().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => token.trim(),
        _ => return Err(AuthError::InvalidAuthHeader),
    };
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware
///
/// Rejects the request unless it carries a valid bearer token. On success the
/// [`AuthUser`] is added to the request extensions.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = extract_bearer_token(header)?;
    let claims = jwt_manager.validate_token(token)?;
    let user = AuthUser::from_claims(&claims)?;

    debug!("Authenticated user: {} ({})", user.id, user.role.as_str());

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
