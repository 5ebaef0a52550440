//! Application state

use redrice_auth::JwtManager;
use redrice_db::Database;
use redrice_storage::ImageStore;
use std::sync::Arc;

/// Handle used to render Prometheus metrics
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub images: Arc<dyn ImageStore>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>, images: Arc<dyn ImageStore>) -> Self {
        Self { db, jwt, images }
    }
}
