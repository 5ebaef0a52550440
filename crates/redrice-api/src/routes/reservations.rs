//! Reservation routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use redrice_auth::{AuthUser, Capability};
use redrice_db::{NewReservation, Reservation, UpdateReservation};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{ApiJson, parse_id};
use crate::state::AppState;

use super::types::{ReservationRequest, ReservationResponse};

async fn ensure_restaurant(state: &AppState, id: i64) -> Result<(), ApiError> {
    if state.db.restaurant_exists(id).await? {
        Ok(())
    } else {
        Err(ApiError::NotFound("Restaurant not found".to_string()))
    }
}

/// Load a reservation and check the caller may touch it
async fn load_owned(state: &AppState, user: &AuthUser, raw_id: &str) -> Result<Reservation, ApiError> {
    let id = parse_id(raw_id, "reservation")?;

    let reservation = state
        .db
        .get_reservation(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    user.require(Capability::AccessReservation(reservation.user_id))?;
    Ok(reservation)
}

// ==================== Reservation Routes ====================

/// GET /reservations
///
/// Admins see every reservation, everyone else only their own.
async fn list_reservations(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationResponse>>, ApiError> {
    let reservations = if user.can(Capability::ViewAllReservations) {
        state.db.list_reservations().await?
    } else {
        state.db.list_reservations_by_user(user.id).await?
    };

    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationResponse::from)
            .collect(),
    ))
}

/// POST /reservations
async fn create_reservation(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), ApiError> {
    let date_time = request
        .date_time
        .ok_or_else(|| ApiError::BadRequest("dateTime is required".to_string()))?;
    let restaurant_id = request
        .restaurant_id
        .ok_or_else(|| ApiError::BadRequest("restaurantId is required".to_string()))?;

    let owner = request.user_id.unwrap_or(user.id);
    if owner != user.id {
        user.require(Capability::ManageUsers)?;
        if state.db.get_user_by_id(owner).await?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
    }
    ensure_restaurant(&state, restaurant_id).await?;

    let reservation = state
        .db
        .insert_reservation(NewReservation {
            date_time,
            user_id: owner,
            restaurant_id,
        })
        .await?;

    info!(
        "Created reservation {} for user {} at restaurant {}",
        reservation.id, reservation.user_id, reservation.restaurant_id
    );

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

/// GET /reservations/{id}
async fn get_reservation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = load_owned(&state, &user, &id).await?;
    Ok(Json(reservation.into()))
}

/// PUT /reservations/{id}
async fn update_reservation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReservationRequest>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let existing = load_owned(&state, &user, &id).await?;

    if request.user_id.is_some_and(|owner| owner != existing.user_id) {
        return Err(ApiError::BadRequest(
            "Reservation owner cannot be changed".to_string(),
        ));
    }
    if let Some(restaurant_id) = request.restaurant_id {
        ensure_restaurant(&state, restaurant_id).await?;
    }

    debug!("Updating reservation: {}", existing.id);

    let updated = state
        .db
        .update_reservation(
            existing.id,
            UpdateReservation {
                date_time: request.date_time,
                restaurant_id: request.restaurant_id,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Reservation not found".to_string()))?;

    Ok(Json(updated.into()))
}

/// DELETE /reservations/{id}
async fn delete_reservation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let existing = load_owned(&state, &user, &id).await?;

    if state.db.delete_reservation(existing.id).await? {
        info!("Deleted reservation: {}", existing.id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Reservation not found".to_string()))
    }
}

/// Create reservation routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(list_reservations).post(create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};
    use redrice_db::NewRestaurant;
    use serde_json::{Value, json};

    async fn restaurant(ctx: &TestContext, name: &str) -> i64 {
        ctx.state
            .db
            .insert_restaurant(NewRestaurant {
                name: name.to_string(),
                address: "1 Sukhumvit".to_string(),
                telephone: "020000000".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn book(ctx: &TestContext, token: &str, restaurant_id: i64) -> Value {
        let (status, body) = ctx
            .send(
                Method::POST,
                "/reservations",
                Some(token),
                Some(json!({
                    "dateTime": "2026-12-24T19:00:00Z",
                    "restaurantId": restaurant_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_create_defaults_owner_to_caller() {
        let ctx = TestContext::new().await;
        let (alice, token) = ctx.user("alice@example.com").await;
        let rid = restaurant(&ctx, "Som Tam Nua").await;

        let created = book(&ctx, &token, rid).await;
        assert_eq!(created["userId"], alice.id);
        assert_eq!(created["restaurantId"], rid);
        assert_eq!(created["dateTime"], "2026-12-24T19:00:00+00:00");

        let (status, list) = ctx
            .send(
                Method::GET,
                &format!("/users/{}/reservations", alice.id),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_restaurant_is_not_found() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("alice@example.com").await;

        let (status, body) = ctx
            .send(
                Method::POST,
                "/reservations",
                Some(&token),
                Some(json!({ "dateTime": "2026-12-24T19:00:00Z", "restaurantId": 404 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Restaurant not found");
        assert!(ctx.state.db.list_reservations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let ctx = TestContext::new().await;
        let (_, token) = ctx.user("alice@example.com").await;
        let rid = restaurant(&ctx, "Som Tam Nua").await;

        let (status, body) = ctx
            .send(
                Method::POST,
                "/reservations",
                Some(&token),
                Some(json!({ "restaurantId": rid })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "dateTime is required");

        let (status, _) = ctx
            .send(
                Method::POST,
                "/reservations",
                Some(&token),
                Some(json!({ "dateTime": "next friday", "restaurantId": rid })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_booking_for_someone_else_needs_admin() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;
        let (_, alice_token) = ctx.user("alice@example.com").await;
        let (bob, _) = ctx.user("bob@example.com").await;
        let rid = restaurant(&ctx, "Som Tam Nua").await;

        let request = json!({
            "dateTime": "2026-12-24T19:00:00Z",
            "restaurantId": rid,
            "userId": bob.id
        });

        let (status, _) = ctx
            .send(Method::POST, "/reservations", Some(&alice_token), Some(request.clone()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = ctx
            .send(Method::POST, "/reservations", Some(&admin), Some(request))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["userId"], bob.id);
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;
        let (_, alice_token) = ctx.user("alice@example.com").await;
        let (_, bob_token) = ctx.user("bob@example.com").await;
        let rid = restaurant(&ctx, "Som Tam Nua").await;

        let alice_booking = book(&ctx, &alice_token, rid).await;
        book(&ctx, &bob_token, rid).await;
        let uri = format!("/reservations/{}", alice_booking["id"]);

        let (status, _) = ctx.send(Method::GET, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = ctx.send(Method::DELETE, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, mine) = ctx.send(Method::GET, "/reservations", Some(&bob_token), None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        let (_, all) = ctx.send(Method::GET, "/reservations", Some(&admin), None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (status, _) = ctx.send(Method::GET, &uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let ctx = TestContext::new().await;
        let (alice, token) = ctx.user("alice@example.com").await;
        let (bob, _) = ctx.user("bob@example.com").await;
        let first = restaurant(&ctx, "Som Tam Nua").await;
        let second = restaurant(&ctx, "Krua Apsorn").await;

        let created = book(&ctx, &token, first).await;
        let uri = format!("/reservations/{}", created["id"]);

        let (status, updated) = ctx
            .send(Method::PUT, &uri, Some(&token), Some(json!({ "restaurantId": second })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["restaurantId"], second);
        assert_eq!(updated["dateTime"], created["dateTime"]);
        assert_eq!(updated["userId"], alice.id);

        let (status, _) = ctx
            .send(Method::PUT, &uri, Some(&token), Some(json!({ "restaurantId": 999 })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = ctx
            .send(Method::PUT, &uri, Some(&token), Some(json!({ "userId": bob.id })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = ctx.send(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleting_restaurant_cascades() {
        let ctx = TestContext::new().await;
        let admin = ctx.admin_token().await;
        let (_, token) = ctx.user("alice@example.com").await;
        let rid = restaurant(&ctx, "Som Tam Nua").await;
        book(&ctx, &token, rid).await;

        let (status, _) = ctx
            .send(Method::DELETE, &format!("/restaurants/{}", rid), Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, list) = ctx.send(Method::GET, "/reservations", Some(&token), None).await;
        assert!(list.as_array().unwrap().is_empty());
    }
}
