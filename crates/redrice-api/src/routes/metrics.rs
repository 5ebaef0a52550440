//! Prometheus metrics endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::state::MetricsHandle;

/// Expose `/metrics`; mounted outside the authenticated routes
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}

async fn render_metrics(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    handle.render()
}
