//! Blob storage for trackvault.
//!
//! The engine persists file bytes through the [`BlobStore`] seam and keeps
//! only metadata in the database. Keys are relative paths of the form
//! `{owner_id}/{file_id}.{ext}`; resolution to a public URL is the store's
//! concern. [`LocalBlobStore`] implements the seam over a local directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::{Result, VaultError};

/// Storage backend for file content.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write content under a key.
    ///
    /// With `overwrite` set, an existing blob under the same key is replaced;
    /// otherwise the write fails.
    async fn put(&self, key: &str, content: &[u8], overwrite: bool) -> Result<()>;

    /// Remove the blobs under the given keys.
    ///
    /// Missing keys are tolerated. Returns the number of blobs actually
    /// removed.
    async fn remove(&self, keys: &[String]) -> Result<u64>;

    /// Resolve the public retrieval URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local-directory implementation of [`BlobStore`].
///
/// Blobs live under a root directory, one file per key:
/// ```text
/// {root}/
/// ├── 7c9e.../
/// │   └── 0b42....mp3
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Base directory for blob storage.
    root: PathBuf,
    /// Public URL prefix blobs are served under.
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore with the given root directory.
    ///
    /// The root directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Get the root path of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root.
    ///
    /// Keys are relative paths; traversal segments are refused.
    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let valid = !key.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(VaultError::Validation(format!("invalid storage key: {key}")));
        }
        Ok(self.root.join(rel))
    }

    /// Read a blob back. Mainly useful for tests and local tooling.
    pub async fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::NotFound(format!("blob {key}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists under a key.
    pub fn exists(&self, key: &str) -> bool {
        self.blob_path(key).map(|p| p.exists()).unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, content: &[u8], overwrite: bool) -> Result<()> {
        let path = self.blob_path(key)?;

        if !overwrite && path.exists() {
            return Err(VaultError::StorageWrite {
                name: key.to_string(),
                detail: "key already exists".to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, content).await?;
        debug!("Stored blob {} ({} bytes)", key, content.len());

        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<u64> {
        let mut removed = 0;

        for key in keys {
            let path = self.blob_path(key)?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("Blob {} already absent", key);
                }
                Err(e) => {
                    return Err(VaultError::StorageRemove(format!("{key}: {e}")));
                }
            }
        }

        Ok(removed)
    }

    fn public_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.public_base_url, encoded.join("/"))
    }
}
