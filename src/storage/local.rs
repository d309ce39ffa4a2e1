use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{BlobStore, StorageError, validate_path};
use crate::config::Config;

type HmacSha256 = Hmac<Sha256>;

/// Filesystem-backed blob store. Download links point at the `/files/{*path}`
/// route and carry an expiry plus an HMAC-SHA256 signature over both.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
    signing_key: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, base_url: &str, signing_key: &str) -> Self {
        Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.storage_dir.clone(),
            &config.base_url,
            &config.storage_signing_key,
        )
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }

    fn mac(&self, path: &str, expires: i64) -> Result<HmacSha256, StorageError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_key.as_bytes())
            .map_err(|e| format!("Invalid signing key: {e}"))?;
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Signature for a download link to `path` valid until the unix timestamp `expires`.
    pub fn sign(&self, path: &str, expires: i64) -> Result<String, StorageError> {
        Ok(hex::encode(self.mac(path, expires)?.finalize().into_bytes()))
    }

    /// Checks a download link's expiry and signature.
    pub fn verify(&self, path: &str, expires: i64, signature: &str) -> Result<(), StorageError> {
        if expires < Utc::now().timestamp() {
            return Err(StorageError::from("Link expired"));
        }
        let provided = hex::decode(signature).map_err(|_| StorageError::from("Malformed signature"))?;
        self.mac(path, expires)?
            .verify_slice(&provided)
            .map_err(|_| StorageError::from("Invalid signature"))
    }

    pub async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        let full = self.resolve(path)?;
        Ok(Bytes::from(tokio::fs::read(full).await?))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, path: &str, bytes: Bytes) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &bytes).await?;
        tracing::debug!("Stored {} bytes at {path}", bytes.len());
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        tokio::fs::remove_file(full).await?;
        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_path(path)?;
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| "TTL out of range")?;
        let expires = Utc::now().timestamp() + ttl_secs;
        let signature = self.sign(path, expires)?;

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature)
            .finish();

        Ok(format!("{}/files/{path}?{query}", self.base_url))
    }
}
