//! S3-compatible image store
//!
//! Uses the `object_store` crate to provide S3-compatible storage for
//! restaurant images. Supports AWS S3, MinIO, and other S3-compatible
//! services.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::{ImageStore, content_type, image_key, public_url};
use crate::error::StorageError;

/// S3 storage configuration
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// S3 region (e.g., "us-east-1")
    pub region: String,
    /// S3 endpoint URL (for MinIO or other S3-compatible services)
    pub endpoint: Option<String>,
    /// AWS access key ID
    pub access_key_id: Option<String>,
    /// AWS secret access key
    pub secret_access_key: Option<String>,
    /// Prefix for all objects (optional)
    pub prefix: Option<String>,
    /// Allow HTTP (not HTTPS) connections
    pub allow_http: bool,
    /// Base URL objects are publicly served from; defaults to the
    /// virtual-hosted bucket URL
    pub public_url: Option<String>,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "redrice".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            prefix: None,
            allow_http: false,
            public_url: None,
        }
    }
}

impl S3Config {
    /// Public base URL for objects in this bucket
    pub fn resolved_public_url(&self) -> String {
        match (&self.public_url, &self.endpoint) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            (None, None) => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// S3 image store
///
/// Stores images at `<prefix>/restaurants/<sha256>.<ext>`.
pub struct S3ImageStore {
    store: Arc<dyn ObjectStore>,
    prefix: String,
    public_url: String,
}

impl S3ImageStore {
    /// Create a new S3 image store
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        // Set endpoint for MinIO or other S3-compatible services
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        // Set credentials
        if let Some(access_key) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }
        if let Some(secret_key) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        // Allow HTTP for local development (MinIO)
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder.build().map_err(|e| {
            StorageError::Configuration(format!("Failed to create S3 client: {}", e))
        })?;

        let public_url = config.resolved_public_url();
        let prefix = config.prefix.unwrap_or_default();

        info!(
            "Initialized S3 image storage: bucket={}, region={}, endpoint={:?}, prefix={}",
            config.bucket, config.region, config.endpoint, prefix
        );

        Ok(Self::with_store(Arc::new(store), prefix, public_url))
    }

    /// Build on top of an existing object store
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        prefix: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into().trim_matches('/').to_string(),
            public_url: public_url.into(),
        }
    }

    fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, data: Bytes, filename: &str) -> Result<String, StorageError> {
        let key = self.object_key(&image_key(&data, filename)?);
        let path = ObjectPath::parse(&key)
            .map_err(|e| StorageError::InvalidUpload(format!("Invalid path: {}", e)))?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type(&key).into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        debug!("Uploading image to S3: {:?} ({} bytes)", path, data.len());

        self.store
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(public_url(&self.public_url, &key))
    }
}
