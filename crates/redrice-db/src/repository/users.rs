//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, UpdateUser, User};
use crate::repository::Database;
use crate::utils::normalize_email;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let email = normalize_email(&user.email);

        // Check if user already exists
        let existing = self.get_user_by_email(&email).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!("Email '{}' already exists", email)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, telephone, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&email)
        .bind(&user.password_hash)
        .bind(&user.telephone)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("Email '{}' already exists", email)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email,
            password_hash: user.password_hash,
            telephone: user.telephone,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, telephone, role, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, telephone, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, telephone, role, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Merge the provided fields into an existing user
    ///
    /// Returns `None` when no user has the given id.
    pub async fn update_user(&self, id: i64, update: UpdateUser) -> Result<Option<User>, DbError> {
        let now = Utc::now();
        let email = update.email.as_deref().map(normalize_email);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash),
                telephone = COALESCE(?, telephone),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(email.as_deref())
        .bind(update.password_hash)
        .bind(update.telephone)
        .bind(update.role.map(|r| r.as_str()))
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from_write(
                e,
                &format!("Email '{}' already exists", email.as_deref().unwrap_or_default()),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_by_id(id).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            telephone: "0812345678".to_string(),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::in_memory().await.unwrap();
        assert!(!db.has_users().await.unwrap());

        let user = db.insert_user(new_user("Alice@Example.com")).await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.email, "alice@example.com");

        let by_email = db.get_user_by_email("ALICE@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.telephone, "0812345678");
        assert!(db.has_users().await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("dup@example.com")).await.unwrap();

        let result = db.insert_user(new_user("dup@example.com")).await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));
        assert_eq!(db.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("a@example.com")).await.unwrap();

        let updated = db
            .update_user(
                user.id,
                UpdateUser {
                    telephone: Some("0899999999".to_string()),
                    role: Some(UserRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.telephone, "0899999999");
        assert_eq!(updated.role, UserRole::Admin);

        let missing = db.update_user(999, UpdateUser::default()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_duplicate() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("first@example.com")).await.unwrap();
        let second = db.insert_user(new_user("second@example.com")).await.unwrap();

        let result = db
            .update_user(
                second.id,
                UpdateUser {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("gone@example.com")).await.unwrap();

        assert!(db.delete_user(user.id).await.unwrap());
        assert!(!db.delete_user(user.id).await.unwrap());
        assert!(db.get_user_by_id(user.id).await.unwrap().is_none());
    }
}
