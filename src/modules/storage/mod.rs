//! Storage module for uploaded file bytes
//!
//! The database row is the source of truth for a stored file; the object
//! kept here is removed on a best-effort basis once the row is purged.

mod filesystem;

use async_trait::async_trait;

use crate::core::error::Result;

pub use filesystem::FilesystemStorage;

/// Result of removing an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The object existed and was deleted
    Removed,
    /// Nothing was stored under the key
    NotFound,
}

/// Object storage backend keyed by stored-file id
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Delete the object stored under `key`.
    ///
    /// A missing object is reported as `RemoveOutcome::NotFound`, not as an error.
    async fn remove(&self, key: &str) -> Result<RemoveOutcome>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> Result<bool>;
}
