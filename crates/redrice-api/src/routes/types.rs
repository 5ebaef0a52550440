//! Request/Response DTOs

use chrono::{DateTime, Utc};
use redrice_db::{Reservation, Restaurant, User};
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Registration (and admin user creation) request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

// ==================== User Types ====================

/// Update user request (all fields optional)
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<String>,
}

/// User response (without password)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub telephone: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            telephone: user.telephone,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Restaurant Types ====================

/// Restaurant fields as submitted by JSON or multipart form
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub telephone: Option<String>,
    pub description: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub rating: Option<f64>,
    pub comment_count: Option<i64>,
}

/// Restaurant response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub telephone: String,
    pub description: String,
    pub image_url: String,
    pub facebook: String,
    pub instagram: String,
    pub open_time: String,
    pub close_time: String,
    pub rating: Option<f64>,
    pub comment_count: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name,
            address: r.address,
            telephone: r.telephone,
            description: r.description,
            image_url: r.image_url,
            facebook: r.facebook,
            instagram: r.instagram,
            open_time: r.open_time,
            close_time: r.close_time,
            rating: r.rating,
            comment_count: r.comment_count,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

// ==================== Reservation Types ====================

/// Create/update reservation request
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub date_time: Option<DateTime<Utc>>,
    pub restaurant_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Reservation response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: i64,
    pub date_time: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id,
            date_time: r.date_time.to_rfc3339(),
            user_id: r.user_id,
            restaurant_id: r.restaurant_id,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}
