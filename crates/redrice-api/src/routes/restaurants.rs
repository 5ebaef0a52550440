//! Restaurant routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveTime;
use redrice_auth::{AuthUser, Capability};
use redrice_db::{NewRestaurant, UpdateRestaurant};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{non_empty, parse_id, required};
use crate::state::AppState;

use super::form::{ImageUpload, RestaurantForm};
use super::types::{RestaurantFields, RestaurantResponse};

/// Maximum restaurant rating
const MAX_RATING: f64 = 5.0;

// ==================== Input Validation ====================

/// Opening hours are `HH:MM`
fn validate_time(value: Option<&str>, field: &str) -> Result<(), ApiError> {
    if let Some(value) = value {
        NaiveTime::parse_from_str(value, "%H:%M")
            .map_err(|_| ApiError::BadRequest(format!("{} must be in HH:MM format", field)))?;
    }
    Ok(())
}

fn validate_fields(fields: &RestaurantFields) -> Result<(), ApiError> {
    validate_time(fields.open_time.as_deref(), "openTime")?;
    validate_time(fields.close_time.as_deref(), "closeTime")?;

    if let Some(rating) = fields.rating {
        if !(0.0..=MAX_RATING).contains(&rating) {
            return Err(ApiError::BadRequest(format!(
                "rating must be between 0 and {}",
                MAX_RATING
            )));
        }
    }
    if let Some(count) = fields.comment_count {
        if count < 0 {
            return Err(ApiError::BadRequest(
                "commentCount cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Forward an image to the upload service and return its URL
async fn upload_image(state: &AppState, image: ImageUpload) -> Result<String, ApiError> {
    debug!("Uploading image {} ({} bytes)", image.filename, image.data.len());

    let url = state.images.upload(image.data, &image.filename).await?;
    metrics::counter!("redrice_image_uploads_total").increment(1);
    Ok(url)
}

// ==================== Restaurant Routes ====================

/// GET /restaurants
async fn list_restaurants(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantResponse>>, ApiError> {
    let restaurants = state.db.list_restaurants().await?;
    Ok(Json(
        restaurants
            .into_iter()
            .map(RestaurantResponse::from)
            .collect(),
    ))
}

/// GET /restaurants/{id}
async fn get_restaurant(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantResponse>, ApiError> {
    let id = parse_id(&id, "restaurant")?;

    let restaurant = state
        .db
        .get_restaurant(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

    Ok(Json(restaurant.into()))
}

/// POST /restaurants (Admin only)
async fn create_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    form: RestaurantForm,
) -> Result<(StatusCode, Json<RestaurantResponse>), ApiError> {
    user.require(Capability::ManageRestaurants)?;

    let RestaurantForm { fields, image } = form;
    validate_fields(&fields)?;

    let name = required(fields.name, "name")?;
    let address = required(fields.address, "address")?;
    let telephone = required(fields.telephone, "telephone")?;

    let image_url = match image {
        Some(image) => upload_image(&state, image).await?,
        None => String::new(),
    };

    let restaurant = state
        .db
        .insert_restaurant(NewRestaurant {
            name,
            address,
            telephone,
            description: non_empty(fields.description).unwrap_or_default(),
            image_url,
            facebook: non_empty(fields.facebook).unwrap_or_default(),
            instagram: non_empty(fields.instagram).unwrap_or_default(),
            open_time: non_empty(fields.open_time).unwrap_or_default(),
            close_time: non_empty(fields.close_time).unwrap_or_default(),
            rating: fields.rating,
            comment_count: fields.comment_count,
        })
        .await?;

    info!("Created restaurant {} ({})", restaurant.id, restaurant.name);

    Ok((StatusCode::CREATED, Json(restaurant.into())))
}

/// PUT /restaurants/{id} (Admin only)
async fn update_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: RestaurantForm,
) -> Result<Json<RestaurantResponse>, ApiError> {
    let id = parse_id(&id, "restaurant")?;
    user.require(Capability::ManageRestaurants)?;

    let RestaurantForm { fields, image } = form;
    validate_fields(&fields)?;

    // Avoid uploading an image for a restaurant that is not there
    if !state.db.restaurant_exists(id).await? {
        return Err(ApiError::NotFound("Restaurant not found".to_string()));
    }

    let image_url = match image {
        Some(image) => Some(upload_image(&state, image).await?),
        None => None,
    };

    let restaurant = state
        .db
        .update_restaurant(
            id,
            UpdateRestaurant {
                name: non_empty(fields.name),
                address: non_empty(fields.address),
                telephone: non_empty(fields.telephone),
                description: non_empty(fields.description),
                image_url,
                facebook: non_empty(fields.facebook),
                instagram: non_empty(fields.instagram),
                open_time: non_empty(fields.open_time),
                close_time: non_empty(fields.close_time),
                rating: fields.rating,
                comment_count: fields.comment_count,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

    info!("Updated restaurant {}", restaurant.id);

    Ok(Json(restaurant.into()))
}

/// DELETE /restaurants/{id} (Admin only)
async fn delete_restaurant(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id, "restaurant")?;
    user.require(Capability::ManageRestaurants)?;

    if state.db.delete_restaurant(id).await? {
        info!("Deleted restaurant {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Restaurant not found".to_string()))
    }
}

/// Create restaurant routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/restaurants/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
}
