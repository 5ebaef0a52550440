//! Restaurant operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewRestaurant, Restaurant, UpdateRestaurant};
use crate::repository::Database;

const RESTAURANT_COLUMNS: &str = "id, name, address, telephone, description, image_url, \
     facebook, instagram, open_time, close_time, rating, comment_count, created_at, updated_at";

impl Database {
    // ==================== Restaurant Operations ====================

    /// Insert a new restaurant
    pub async fn insert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO restaurants (
                name, address, telephone, description, image_url,
                facebook, instagram, open_time, close_time, rating, comment_count,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.telephone)
        .bind(&restaurant.description)
        .bind(&restaurant.image_url)
        .bind(&restaurant.facebook)
        .bind(&restaurant.instagram)
        .bind(&restaurant.open_time)
        .bind(&restaurant.close_time)
        .bind(restaurant.rating)
        .bind(restaurant.comment_count)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Restaurant {
            id,
            name: restaurant.name,
            address: restaurant.address,
            telephone: restaurant.telephone,
            description: restaurant.description,
            image_url: restaurant.image_url,
            facebook: restaurant.facebook,
            instagram: restaurant.instagram,
            open_time: restaurant.open_time,
            close_time: restaurant.close_time,
            rating: restaurant.rating,
            comment_count: restaurant.comment_count,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a restaurant by ID
    pub async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, DbError> {
        let sql = format!("SELECT {} FROM restaurants WHERE id = ?", RESTAURANT_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result
            .map(|row| Restaurant::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List all restaurants
    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, DbError> {
        let sql = format!("SELECT {} FROM restaurants ORDER BY id", RESTAURANT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Restaurant::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Check whether a restaurant exists
    pub async fn restaurant_exists(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM restaurants WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }

    /// Merge the provided fields into an existing restaurant
    ///
    /// Returns `None` when no restaurant has the given id.
    pub async fn update_restaurant(
        &self,
        id: i64,
        update: UpdateRestaurant,
    ) -> Result<Option<Restaurant>, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET name = COALESCE(?, name),
                address = COALESCE(?, address),
                telephone = COALESCE(?, telephone),
                description = COALESCE(?, description),
                image_url = COALESCE(?, image_url),
                facebook = COALESCE(?, facebook),
                instagram = COALESCE(?, instagram),
                open_time = COALESCE(?, open_time),
                close_time = COALESCE(?, close_time),
                rating = COALESCE(?, rating),
                comment_count = COALESCE(?, comment_count),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.address)
        .bind(update.telephone)
        .bind(update.description)
        .bind(update.image_url)
        .bind(update.facebook)
        .bind(update.instagram)
        .bind(update.open_time)
        .bind(update.close_time)
        .bind(update.rating)
        .bind(update.comment_count)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_restaurant(id).await
    }

    /// Delete a restaurant (its reservations go with it)
    pub async fn delete_restaurant(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
