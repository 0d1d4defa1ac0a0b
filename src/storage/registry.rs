//! Promoted-model registry
//!
//! Owns the well-known object-store key where the currently promoted bundle
//! lives. Evaluation reads through it once per run; promotion writes through
//! it at most once per run, overwriting without versioning.

use super::object::ObjectStore;
use crate::error::Result;
use crate::model::Bundle;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// SHA-256 digest of a payload, hex encoded
pub fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Access to the promoted-model slot
#[derive(Clone)]
pub struct ModelRegistry {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
}

impl ModelRegistry {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Bucket holding the slot
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Well-known key of the slot
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a promoted model currently exists
    pub fn is_model_present(&self) -> Result<bool> {
        Ok(self.store.exists(&self.key)?)
    }

    /// Fetch and decode the promoted bundle
    pub fn load(&self) -> Result<Bundle> {
        let data = self.store.get(&self.key)?;
        Bundle::from_bytes(&data)
    }

    /// Upload a serialized bundle from a local file, overwriting the slot
    ///
    /// Returns the digest of the uploaded payload.
    pub fn save_from_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let data = std::fs::read(path.as_ref())?;
        let digest = compute_digest(&data);
        self.store.put(&self.key, &data)?;
        info!(
            bucket = %self.bucket,
            key = %self.key,
            bytes = data.len(),
            %digest,
            "uploaded model bundle"
        );
        Ok(digest)
    }
}
