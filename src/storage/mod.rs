pub mod local;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug)]
pub struct StorageError {
    pub message: String,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<String> for StorageError {
    fn from(s: String) -> Self {
        StorageError { message: s }
    }
}

impl From<&str> for StorageError {
    fn from(s: &str) -> Self {
        StorageError {
            message: s.to_string(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError {
            message: format!("I/O error: {err}"),
        }
    }
}

/// External content store for report attachments, addressed by opaque path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, path: &str, bytes: Bytes) -> Result<(), StorageError>;

    async fn remove(&self, path: &str) -> Result<(), StorageError>;

    /// Time-limited, read-only retrieval URL for `path`.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageError>;
}

/// Rejects absolute paths and parent-directory segments.
pub fn validate_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(StorageError::from(format!("Invalid storage path '{path}'")));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::from(format!("Invalid storage path '{path}'")));
    }
    Ok(())
}
