//! Image store trait

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::error::StorageError;

/// File extensions accepted for restaurant images
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Image store trait
///
/// Implementations persist an uploaded image and return the URL clients
/// should use to fetch it.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store an image and return its public URL
    async fn upload(&self, data: Bytes, filename: &str) -> Result<String, StorageError>;
}

/// Lower-cased extension of an upload, if it is an accepted image type
pub fn image_extension(filename: &str) -> Result<String, StorageError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            StorageError::InvalidUpload(format!("'{}' has no file extension", filename))
        })?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::InvalidUpload(format!(
            "unsupported image type '.{}'",
            ext
        )));
    }
    Ok(ext)
}

/// Content-addressed object key for an image: `restaurants/<sha256>.<ext>`
///
/// Identical uploads map to the same key, and client-supplied file names
/// never reach the storage path.
pub fn image_key(data: &[u8], filename: &str) -> Result<String, StorageError> {
    if data.is_empty() {
        return Err(StorageError::InvalidUpload("image is empty".to_string()));
    }
    let ext = image_extension(filename)?;

    let mut hasher = Sha256::new();
    hasher.update(data);
    Ok(format!("restaurants/{}.{}", hex::encode(hasher.finalize()), ext))
}

/// Content type to record for an image key
pub fn content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Join a public base URL and an object key
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
