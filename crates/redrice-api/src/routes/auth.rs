//! Registration, sign-in and identity routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use redrice_auth::{AuthError, AuthUser, verify_password};
use redrice_db::UserRole;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::extract::{ApiJson, non_empty};
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use super::users::{create_account, parse_role};

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    // Self-registration only creates plain users; admins come from POST /users
    if let Some(role) = non_empty(request.role.clone()) {
        if parse_role(&role)? != UserRole::User {
            warn!("Rejected self-registration with role {}", role);
            return Err(AuthError::InsufficientPermissions.into());
        }
    }

    let user = create_account(&state, request).await?;

    metrics::counter!("redrice_registrations_total").increment(1);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/signin
async fn signin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    debug!("Login attempt for: {}", request.email);

    let user = match state.db.get_user_by_email(&request.email).await? {
        Some(user) => user,
        None => {
            metrics::counter!("redrice_logins_total", "outcome" => "unknown_user").increment(1);
            return Err(ApiError::NotFound("User not found".to_string()));
        }
    };

    if !verify_password(&request.password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        metrics::counter!("redrice_logins_total", "outcome" => "bad_password").increment(1);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.generate_token(user.id, user.role)?;

    metrics::counter!("redrice_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.id);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.token_lifetime_secs(),
    }))
}

/// GET /me
async fn me(user: AuthUser, State(state): State<AppState>) -> Result<Json<UserResponse>, ApiError> {
    let found = state
        .db
        .get_user_by_id(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(found.into()))
}

/// Routes reachable without a token
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/signin", post(signin))
}

/// Routes that need the authenticated identity
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
