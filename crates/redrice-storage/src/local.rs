//! Local disk image store

use async_trait::async_trait;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{ImageStore, image_key, public_url};
use crate::error::StorageError;

/// Local disk image store
///
/// Writes images below `<base_path>/restaurants/`; the server exposes
/// `base_path` at `public_url`.
pub struct LocalImageStore {
    base_path: PathBuf,
    public_url: String,
}

impl LocalImageStore {
    /// Create a new local image store
    pub async fn new(
        base_path: impl AsRef<Path>,
        public_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(base_path.join("restaurants")).await?;

        let public_url = public_url.into();
        info!("Initialized local image storage at {:?} ({})", base_path, public_url);

        Ok(Self {
            base_path,
            public_url,
        })
    }

    /// Directory the images are written to
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Write `data` to a uniquely named temp file beside `path`, then rename it
/// into place. Concurrent writers of the same key each persist a complete
/// file, so readers never observe a partial image.
async fn write_atomic(path: PathBuf, data: Bytes) -> Result<(), StorageError> {
    tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(&data)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, data: Bytes, filename: &str) -> Result<String, StorageError> {
        let key = image_key(&data, filename)?;
        let path = self.base_path.join(&key);

        if fs::try_exists(&path).await? {
            debug!("Image already stored: {:?}", path);
        } else {
            write_atomic(path.clone(), data.clone()).await?;
            debug!("Stored image {:?} ({} bytes)", path, data.len());
        }

        Ok(public_url(&self.public_url, &key))
    }
}
