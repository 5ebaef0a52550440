//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidUserRole(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserRole(s) => write!(f, "Invalid user role: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            _ => Err(ParseError::InvalidUserRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub telephone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub telephone: String,
    pub role: UserRole,
}

/// Update user (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<UserRole>,
}

/// Restaurant model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New restaurant (for insertion)
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
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
}

/// Update restaurant (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateRestaurant {
    pub name: Option<String>,
    pub address: Option<String>,
    pub telephone: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub rating: Option<f64>,
    pub comment_count: Option<i64>,
}

/// Reservation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub date_time: DateTime<Utc>,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New reservation (for insertion)
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub date_time: DateTime<Utc>,
    pub user_id: i64,
    pub restaurant_id: i64,
}

/// Update reservation (for partial updates)
#[derive(Debug, Clone, Default)]
pub struct UpdateReservation {
    pub date_time: Option<DateTime<Utc>>,
    pub restaurant_id: Option<i64>,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            telephone: row.try_get("telephone")?,
            role: UserRole::from_str(&role_str).unwrap_or_default(),
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Restaurant {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Restaurant {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            telephone: row.try_get("telephone")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            facebook: row.try_get("facebook")?,
            instagram: row.try_get("instagram")?,
            open_time: row.try_get("open_time")?,
            close_time: row.try_get("close_time")?,
            rating: row.try_get("rating")?,
            comment_count: row.try_get("comment_count")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Reservation {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.try_get("id")?,
            date_time: parse_datetime_or_now(&row.try_get::<String, _>("date_time")?),
            user_id: row.try_get("user_id")?,
            restaurant_id: row.try_get("restaurant_id")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_round_trip() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("user".parse::<UserRole>().unwrap(), UserRole::User);
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            telephone: "0800000000".to_string(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("alice@example.com"));
    }
}
