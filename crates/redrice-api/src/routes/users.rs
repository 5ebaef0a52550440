//! User management routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use redrice_auth::{AuthUser, Capability, hash_password};
use redrice_db::{NewUser, UpdateUser, User, UserRole};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{ApiJson, non_empty, parse_id, required};
use crate::state::AppState;

use super::types::{RegisterRequest, ReservationResponse, UpdateUserRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed password length
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate email shape and length
pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::BadRequest("Invalid email address".to_string())),
    }
}

/// Validate password length
pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub(crate) fn parse_role(role: &str) -> Result<UserRole, ApiError> {
    role.parse::<UserRole>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role)))
}

/// Validate a registration request, hash the password and store the user
pub(crate) async fn create_account(
    state: &AppState,
    request: RegisterRequest,
) -> Result<User, ApiError> {
    let name = required(request.name, "name")?;
    let email = required(request.email, "email")?;
    let telephone = required(request.telephone, "telephone")?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("password is required".to_string()))?;
    let role = match non_empty(request.role) {
        Some(role) => parse_role(&role)?,
        None => UserRole::User,
    };

    validate_email(&email)?;
    validate_password(&password)?;

    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user = state
        .db
        .insert_user(NewUser {
            name,
            email,
            password_hash,
            telephone,
            role,
        })
        .await
        .map_err(|e| match e {
            redrice_db::DbError::Duplicate(_) => {
                ApiError::Conflict("Email already exists".to_string())
            }
            other => other.into(),
        })?;

    info!("Created user {} ({})", user.id, user.role.as_str());
    Ok(user)
}

// ==================== User Routes ====================

/// GET /users (Admin only)
async fn list_users(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    user.require(Capability::ManageUsers)?;

    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /users (Admin only)
async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    user.require(Capability::ManageUsers)?;

    let created = create_account(&state, request).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /users/{id}
async fn get_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    user.require(Capability::AccessUser(id))?;

    let found = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(found.into()))
}

/// PUT /users/{id}
async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id, "user")?;
    user.require(Capability::AccessUser(id))?;

    debug!("Updating user: {}", id);

    let role = match non_empty(request.role) {
        Some(role) => {
            user.require(Capability::ManageUsers)?;
            Some(parse_role(&role)?)
        }
        None => None,
    };

    let email = non_empty(request.email);
    if let Some(email) = &email {
        validate_email(email)?;
    }

    let password_hash = match request.password.filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let updated = state
        .db
        .update_user(
            id,
            UpdateUser {
                name: non_empty(request.name),
                email,
                password_hash,
                telephone: non_empty(request.telephone),
                role,
            },
        )
        .await
        .map_err(|e| match e {
            redrice_db::DbError::Duplicate(_) => {
                ApiError::Conflict("Email already exists".to_string())
            }
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("Updated user: {}", updated.id);
    Ok(Json(updated.into()))
}

/// DELETE /users/{id}
async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "user")?;
    user.require(Capability::AccessUser(id))?;

    debug!("Deleting user: {}", id);

    if state.db.delete_user(id).await? {
        info!("Deleted user: {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found".to_string()))
    }
}

/// GET /users/{id}/reservations
async fn list_user_reservations(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let id = parse_id(&id, "user")?;
    user.require(Capability::AccessUser(id))?;

    if state.db.get_user_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let reservations = state.db.list_reservations_by_user(id).await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/reservations", get(list_user_reservations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use axum::http::Method;
    use serde_json::json;

    #[test]
    fn test_validate_email_and_password() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@domain").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
        assert!(validate_password(&"x".repeat(300)).is_err());
    }

    #[tokio::test]
    async fn test_get_user_not_found_and_bad_id() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;

        let (status, body) = ctx.send(Method::GET, "/users/9999", Some(&admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        let (status, body) = ctx.send(Method::GET, "/users/abc", Some(&admin), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid user id");

        let (status, body) = ctx
            .send(Method::GET, "/users/9999/reservations", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_user_can_only_see_self() {
        let ctx = TestContext::new().await;
        let (alice, alice_token) = ctx.user("alice@example.com").await;
        let (bob, _) = ctx.user("bob@example.com").await;

        let (status, body) = ctx
            .send(Method::GET, &format!("/users/{}", alice.id), Some(&alice_token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "alice@example.com");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());

        let (status, _) = ctx
            .send(Method::GET, &format!("/users/{}", bob.id), Some(&alice_token), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = ctx.send(Method::GET, "/users", Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_crud_cycle() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;

        let (status, created) = ctx
            .send(
                Method::POST,
                "/users",
                Some(&admin),
                Some(json!({
                    "name": "Carol",
                    "email": "carol@example.com",
                    "password": "carol-password",
                    "telephone": "0822222222"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["role"], "user");
        let id = created["id"].as_i64().unwrap();

        let (status, updated) = ctx
            .send(
                Method::PUT,
                &format!("/users/{}", id),
                Some(&admin),
                Some(json!({ "telephone": "0833333333", "role": "admin" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Carol");
        assert_eq!(updated["telephone"], "0833333333");
        assert_eq!(updated["role"], "admin");

        let (status, list) = ctx.send(Method::GET, "/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (status, _) = ctx
            .send(Method::DELETE, &format!("/users/{}", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = ctx
            .send(Method::DELETE, &format!("/users/{}", id), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_cannot_promote_self() {
        let ctx = TestContext::new().await;
        let (alice, token) = ctx.user("alice@example.com").await;

        let (status, _) = ctx
            .send(
                Method::PUT,
                &format!("/users/{}", alice.id),
                Some(&token),
                Some(json!({ "role": "admin" })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = ctx
            .send(
                Method::PUT,
                &format!("/users/{}", alice.id),
                Some(&token),
                Some(json!({ "name": "Alice B." })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Alice B.");
        assert_eq!(body["role"], "user");
    }

    #[tokio::test]
    async fn test_update_email_conflict_and_malformed_body() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;
        let (alice, _) = ctx.user("alice@example.com").await;
        ctx.user("bob@example.com").await;

        let (status, _) = ctx
            .send(
                Method::PUT,
                &format!("/users/{}", alice.id),
                Some(&admin),
                Some(json!({ "email": "bob@example.com" })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = ctx
            .send_raw(
                Method::PUT,
                &format!("/users/{}", alice.id),
                Some(&admin),
                "application/json",
                b"{not json".to_vec(),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
