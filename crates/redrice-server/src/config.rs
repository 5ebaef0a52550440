//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Secret shipped in the defaults; never fit for production
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
/// Password of the seeded admin account when none is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin12345";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub bootstrap: BootstrapConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_expiry_hours: default_token_expiry_hours(),
        }
    }
}

/// Image storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub local: LocalStorageConfig,
    #[serde(default)]
    pub s3: S3StorageConfig,
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_local_path")]
    pub path: String,
    /// URL prefix the `/images` route is reachable at
    #[serde(default = "default_local_public_url")]
    pub public_url: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            path: default_local_path(),
            public_url: default_local_public_url(),
        }
    }
}

/// S3 storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3StorageConfig {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub prefix: Option<String>,
    #[serde(default)]
    pub allow_http: bool,
    pub public_url: Option<String>,
}

impl S3StorageConfig {
    /// Convert into the storage crate's configuration, filling defaults
    pub fn to_s3_config(&self) -> redrice_storage::S3Config {
        let defaults = redrice_storage::S3Config::default();
        redrice_storage::S3Config {
            bucket: self.bucket.clone().unwrap_or(defaults.bucket),
            region: self.region.clone().unwrap_or(defaults.region),
            endpoint: self.endpoint.clone(),
            access_key_id: self.access_key.clone(),
            secret_access_key: self.secret_key.clone(),
            prefix: self.prefix.clone(),
            allow_http: self.allow_http,
            public_url: self.public_url.clone(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

/// Admin account seeded into an empty database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "./data/redrice.db".to_string()
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_token_expiry_hours() -> i64 {
    24
}

fn default_local_path() -> String {
    "./data/images".to_string()
}

fn default_local_public_url() -> String {
    "http://localhost:5000/images".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_admin_email() -> String {
    "admin@redrice.local".to_string()
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

impl Config {
    /// Load configuration from a file
    ///
    /// Returns `None` when the file does not exist. This runs before logging
    /// is set up, so callers report the outcome themselves.
    pub fn load(path: &str) -> Result<Option<Self>> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(Some(config))
    }

    fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Whether the shipped JWT secret is still in use
    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Whether the seeded admin would get the shipped password
    pub fn uses_default_admin_password(&self) -> bool {
        self.bootstrap.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}
