//! Reservation operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewReservation, Reservation, UpdateReservation};
use crate::repository::Database;

impl Database {
    // ==================== Reservation Operations ====================

    /// Insert a new reservation
    ///
    /// Fails with `InvalidReference` if the user or restaurant does not exist.
    pub async fn insert_reservation(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO reservations (date_time, user_id, restaurant_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(reservation.date_time.to_rfc3339())
        .bind(reservation.user_id)
        .bind(reservation.restaurant_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(
                e,
                &format!(
                    "user {} or restaurant {} does not exist",
                    reservation.user_id, reservation.restaurant_id
                ),
            )
        })?;

        let id: i64 = result.get("id");

        Ok(Reservation {
            id,
            date_time: reservation.date_time,
            user_id: reservation.user_id,
            restaurant_id: reservation.restaurant_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a reservation by ID
    pub async fn get_reservation(&self, id: i64) -> Result<Option<Reservation>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, date_time, user_id, restaurant_id, created_at, updated_at
            FROM reservations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Reservation::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// List all reservations
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, date_time, user_id, restaurant_id, created_at, updated_at
            FROM reservations
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Reservation::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List the reservations made by one user
    pub async fn list_reservations_by_user(&self, user_id: i64) -> Result<Vec<Reservation>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, date_time, user_id, restaurant_id, created_at, updated_at
            FROM reservations
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Reservation::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Merge the provided fields into an existing reservation
    ///
    /// Returns `None` when no reservation has the given id.
    pub async fn update_reservation(
        &self,
        id: i64,
        update: UpdateReservation,
    ) -> Result<Option<Reservation>, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET date_time = COALESCE(?, date_time),
                restaurant_id = COALESCE(?, restaurant_id),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.date_time.map(|dt| dt.to_rfc3339()))
        .bind(update.restaurant_id)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(
                e,
                &format!(
                    "restaurant {} does not exist",
                    update.restaurant_id.unwrap_or_default()
                ),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_reservation(id).await
    }

    /// Delete a reservation
    pub async fn delete_reservation(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
