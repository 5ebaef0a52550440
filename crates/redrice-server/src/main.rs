//! RedRice - Restaurant reservation backend

use anyhow::Result;
use axum::Router;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat, LoggingConfig, StorageBackend};
use redrice_api::{AppState, create_router};
use redrice_auth::{JwtManager, hash_password};
use redrice_db::{Database, NewUser, UserRole};
use redrice_storage::{ImageStore, LocalImageStore, S3ImageStore};

/// RedRice - Restaurant reservation backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "REDRICE_CONFIG", default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "REDRICE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "REDRICE_PORT")]
    port: Option<u16>,

    /// Secret used to sign access tokens
    #[arg(long, env = "REDRICE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = Config::load(&args.config)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Logging depends on the config, so report how it was loaded afterwards
    init_logging(&config.logging);

    info!("Starting RedRice v{}", env!("CARGO_PKG_VERSION"));
    if found {
        info!("Loaded configuration from {}", args.config);
    } else {
        info!("Config file not found at {}, using defaults", args.config);
    }

    if config.uses_default_secret() {
        warn!("Using the default JWT secret; set REDRICE_JWT_SECRET or auth.jwt_secret");
    }

    // Initialize database
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    bootstrap_admin(&db, &config).await?;

    // Initialize image storage
    let mut image_dir = None;
    let images: Arc<dyn ImageStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store = LocalImageStore::new(
                &config.storage.local.path,
                config.storage.local.public_url.clone(),
            )
            .await?;
            image_dir = Some(store.base_path().to_path_buf());
            Arc::new(store)
        }
        StorageBackend::S3 => {
            let s3 = config.storage.s3.to_s3_config();
            info!("Using S3 image storage (bucket: {})", s3.bucket);
            Arc::new(S3ImageStore::new(s3)?)
        }
    };

    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.token_expiry_hours,
    ));

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        Some(Arc::new(handle))
    } else {
        None
    };

    let state = AppState::new(db, jwt, images);

    let mut app: Router = create_router(state, metrics_handle);
    if let Some(dir) = image_dir {
        app = app.nest_service("/images", ServeDir::new(dir));
    }
    let app = app.layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Seed an admin account when the users table is empty
async fn bootstrap_admin(db: &Database, config: &Config) -> Result<()> {
    if db.has_users().await? {
        return Ok(());
    }

    info!("Creating default admin user");
    if config.uses_default_admin_password() {
        warn!(
            "Seeding {} with the default password; set bootstrap.admin_password and change it after first login",
            config.bootstrap.admin_email
        );
    }
    let password_hash = hash_password(&config.bootstrap.admin_password)?;
    db.insert_user(NewUser {
        name: "Administrator".to_string(),
        email: config.bootstrap.admin_email.clone(),
        password_hash,
        telephone: String::new(),
        role: UserRole::Admin,
    })
    .await?;
    info!(
        "Default admin user created (email: {})",
        config.bootstrap.admin_email
    );
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Keep serving; the process can still be stopped externally
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
