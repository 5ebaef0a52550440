//! RedRice Storage Layer
//!
//! This crate stores restaurant images and hands back the public URL they
//! are served from. Local disk and S3-compatible backends are supported.

pub mod backend;
pub mod error;
pub mod local;
pub mod s3;

pub use backend::ImageStore;
pub use error::StorageError;
pub use local::LocalImageStore;
pub use s3::{S3Config, S3ImageStore};
