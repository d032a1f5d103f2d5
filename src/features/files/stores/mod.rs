//! Persistence contract for file lifecycle transitions.

mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::StoredFile;
use crate::shared::actor::Actor;

pub use postgres::PgFileLifecycleStore;

/// Relational queries the retention engine needs over files and quotas.
///
/// Every mutation is a single row-atomic statement; callers never rely on a
/// transaction spanning two calls.
#[async_trait]
pub trait FileLifecycleStore: Send + Sync {
    async fn find_file(&self, file_id: Uuid) -> Result<Option<StoredFile>>;

    /// Live files whose expiry is set and earlier than `now`
    async fn find_expired_active_files(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>>;

    /// Trashed files whose soft-delete timestamp is earlier than `cutoff`
    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<StoredFile>>;

    /// Trashed files, newest first, optionally for a single owner
    async fn list_trashed(&self, user_id: Option<i64>) -> Result<Vec<StoredFile>>;

    /// Move a live file to trash. Fails with `NotFound` if the file is missing
    /// or already trashed.
    async fn soft_delete_file(&self, file_id: Uuid, actor: &Actor, at: DateTime<Utc>)
        -> Result<()>;

    /// Take a trashed file out of trash. Fails with `NotFound` if the file is
    /// missing or not trashed.
    async fn restore_file(&self, file_id: Uuid) -> Result<()>;

    async fn permanently_delete_file_record(&self, file_id: Uuid) -> Result<()>;

    /// Sum of the sizes of the user's files that are not trashed
    async fn compute_live_storage_for_user(&self, user_id: i64) -> Result<i64>;

    async fn set_user_storage_usage(&self, user_id: i64, bytes: i64) -> Result<()>;
}
