//! RedRice REST API
//!
//! This crate provides the Axum-based HTTP API for the RedRice reservation
//! backend: authentication, users, restaurants and reservations.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
