//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl DbError {
    /// Classify a write error, turning constraint violations into
    /// `Duplicate` / `InvalidReference` with the given context.
    pub(crate) fn from_write(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::Duplicate(context.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DbError::InvalidReference(context.to_string());
            }
        }
        DbError::Connection(err)
    }
}
