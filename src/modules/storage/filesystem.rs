//! Filesystem storage backend.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{ObjectStorage, RemoveOutcome};
use crate::core::error::{AppError, Result};

/// Stores each object as a flat file named after its key
pub struct FilesystemStorage {
    base_path: PathBuf,
}

impl FilesystemStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full path for a key; keys never address anything outside `base_path`
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(|c| c == '/' || c == '\\');
        if !valid {
            return Err(AppError::Storage(format!("Invalid object key: {:?}", key)));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl ObjectStorage for FilesystemStorage {
    async fn remove(&self, key: &str) -> Result<RemoveOutcome> {
        let path = self.object_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RemoveOutcome::NotFound),
            Err(e) => Err(AppError::Storage(format!("Failed to delete {}: {}", key, e))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.object_path(key)?;
        fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat {}: {}", key, e)))
    }
}
