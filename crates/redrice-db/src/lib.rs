//! RedRice Database Layer
//!
//! This crate provides the persistence layer for the RedRice reservation
//! backend, using SQLite via sqlx. Users, restaurants and reservations each
//! get their own set of operations on [`Database`].

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
