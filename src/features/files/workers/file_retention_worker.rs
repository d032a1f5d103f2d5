use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::core::config::retention_days_or_default;
use crate::core::error::Result;
use crate::features::files::models::StoredFile;
use crate::features::files::services::QuotaService;
use crate::features::files::stores::FileLifecycleStore;
use crate::modules::storage::{ObjectStorage, RemoveOutcome};
use crate::shared::actor::Actor;
use crate::shared::constants::DEFAULT_TRASH_RETENTION_DAYS;
use crate::shared::time::days_before;

/// Outcome of one expiration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExpirePassReport {
    pub candidates: usize,
    pub trashed: usize,
    pub failed: usize,
}

/// Outcome of one trash purge pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PurgePassReport {
    pub candidates: usize,
    pub purged: usize,
    pub failed: usize,
    /// Files whose bytes could not be removed; their rows were still deleted
    pub disk_warnings: usize,
    pub bytes_freed: i64,
}

/// Outcome of a full tick. A pass is `None` when its candidate query failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct FileRetentionReport {
    pub expired: Option<ExpirePassReport>,
    pub purged: Option<PurgePassReport>,
}

/// Moves expired files to trash and erases files that sat in trash past the
/// retention window.
///
/// Every file is handled on its own: a failure is logged and the pass moves
/// on, so one bad row never stalls the rest. Each pass is a no-op when run a
/// second time against unchanged data.
pub struct FileRetentionWorker {
    store: Arc<dyn FileLifecycleStore>,
    storage: Arc<dyn ObjectStorage>,
    quota: Arc<QuotaService>,
    trash_retention_days: i64,
}

impl FileRetentionWorker {
    pub fn new(
        store: Arc<dyn FileLifecycleStore>,
        storage: Arc<dyn ObjectStorage>,
        quota: Arc<QuotaService>,
        trash_retention_days: i64,
    ) -> Self {
        Self {
            store,
            storage,
            quota,
            trash_retention_days: retention_days_or_default(
                trash_retention_days,
                DEFAULT_TRASH_RETENTION_DAYS,
            ),
        }
    }

    pub fn trash_retention_days(&self) -> i64 {
        self.trash_retention_days
    }

    /// Scheduler entry point
    pub async fn tick(&self) -> FileRetentionReport {
        self.run_once(Utc::now()).await
    }

    /// Expiration pass followed by the trash pass. Neither pass can abort the
    /// other.
    pub async fn run_once(&self, now: DateTime<Utc>) -> FileRetentionReport {
        let expired = match self.expire_pass(now).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Error querying expired files: {}", e);
                None
            }
        };

        let purged = match self.purge_pass(now).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Error querying old trash files: {}", e);
                None
            }
        };

        FileRetentionReport { expired, purged }
    }

    /// Soft-delete every live file whose expiry has passed
    pub async fn expire_pass(&self, now: DateTime<Utc>) -> Result<ExpirePassReport> {
        let files = self.store.find_expired_active_files(now).await?;
        let mut report = ExpirePassReport {
            candidates: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            return Ok(report);
        }

        tracing::info!("Moving {} expired files to trash", files.len());

        for file in files {
            if let Err(e) = self
                .store
                .soft_delete_file(file.id, &Actor::System, now)
                .await
            {
                tracing::warn!("Error moving expired file {} to trash: {}", file.id, e);
                report.failed += 1;
                continue;
            }

            self.refresh_quota(file.user_id).await;
            report.trashed += 1;

            tracing::info!(
                "Moved expired file to trash: {} (ID: {}, expired: {:?})",
                file.name,
                file.id,
                file.expires_at
            );
        }

        tracing::info!(
            "Expiration cleanup complete: {} files moved to trash",
            report.trashed
        );

        Ok(report)
    }

    /// Erase files that have been in trash longer than the retention window
    pub async fn purge_pass(&self, now: DateTime<Utc>) -> Result<PurgePassReport> {
        let cutoff = days_before(now, self.trash_retention_days);
        self.purge_trashed_before(cutoff).await
    }

    /// Erase every trashed file whose soft-delete time is before `cutoff`
    pub async fn purge_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<PurgePassReport> {
        let files = self.store.find_trashed_before(cutoff).await?;
        let mut report = PurgePassReport {
            candidates: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            return Ok(report);
        }

        tracing::info!(
            "Permanently deleting {} files from trash (retention: {} days)",
            files.len(),
            self.trash_retention_days
        );

        for file in files {
            if !self.remove_object(&file).await {
                report.disk_warnings += 1;
            }

            if let Err(e) = self.store.permanently_delete_file_record(file.id).await {
                tracing::warn!("Error deleting file {} from database: {}", file.id, e);
                report.failed += 1;
                continue;
            }

            self.refresh_quota(file.user_id).await;
            report.purged += 1;
            report.bytes_freed += file.size_bytes;

            tracing::info!(
                "Permanently deleted file: {} (ID: {}, deleted: {:?})",
                file.name,
                file.id,
                file.deleted_at
            );
        }

        tracing::info!(
            "Trash cleanup complete: {} files permanently deleted",
            report.purged
        );

        Ok(report)
    }

    /// Returns false when the bytes could not be removed. A missing object
    /// counts as removed.
    async fn remove_object(&self, file: &StoredFile) -> bool {
        match self.storage.remove(&file.object_key()).await {
            Ok(RemoveOutcome::Removed) => true,
            Ok(RemoveOutcome::NotFound) => {
                tracing::debug!("File {} already absent from storage", file.id);
                true
            }
            Err(e) => {
                tracing::warn!("Could not delete file from disk {}: {}", file.object_key(), e);
                false
            }
        }
    }

    async fn refresh_quota(&self, user_id: i64) {
        if let Err(e) = self.quota.refresh(user_id).await {
            tracing::warn!("Could not recalculate storage for user {}: {}", user_id, e);
        }
    }
}
