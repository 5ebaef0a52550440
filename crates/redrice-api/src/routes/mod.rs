//! API routes

mod auth;
mod form;
mod health;
pub mod metrics;
mod reservations;
mod restaurants;
mod types;
mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
};
use redrice_auth::auth_middleware;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Restaurant forms carry an image, so allow up to 10 MiB bodies
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

async fn not_found() -> Response {
    ApiError::NotFound("Not found".to_string()).into_response()
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    // Everything in here requires a valid bearer token
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(restaurants::routes())
        .merge(reservations::routes())
        .route_layer(from_fn_with_state(state.jwt.clone(), auth_middleware));

    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Registration and sign-in
        .merge(auth::routes())
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router.fallback(not_found)
}
