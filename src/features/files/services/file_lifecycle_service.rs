use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::StoredFile;
use crate::features::files::services::QuotaService;
use crate::features::files::stores::FileLifecycleStore;
use crate::modules::storage::{ObjectStorage, RemoveOutcome};
use crate::shared::actor::Actor;

/// On-demand file transitions (trash, restore, purge) requested by users or
/// operators. Each transition refreshes the owner's quota.
pub struct FileLifecycleService {
    store: Arc<dyn FileLifecycleStore>,
    storage: Arc<dyn ObjectStorage>,
    quota: Arc<QuotaService>,
}

impl FileLifecycleService {
    pub fn new(
        store: Arc<dyn FileLifecycleStore>,
        storage: Arc<dyn ObjectStorage>,
        quota: Arc<QuotaService>,
    ) -> Self {
        Self {
            store,
            storage,
            quota,
        }
    }

    async fn get(&self, file_id: Uuid) -> Result<StoredFile> {
        self.store
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))
    }

    /// List trashed files, optionally for one owner
    pub async fn list_trash(&self, user_id: Option<i64>) -> Result<Vec<StoredFile>> {
        self.store.list_trashed(user_id).await
    }

    /// Move a live file to trash
    #[allow(dead_code)]
    pub async fn trash(&self, file_id: Uuid, actor: &Actor, now: DateTime<Utc>) -> Result<StoredFile> {
        let file = self.get(file_id).await?;
        if file.is_trashed() {
            return Err(AppError::Conflict(format!("File {} is already in trash", file_id)));
        }

        self.store.soft_delete_file(file_id, actor, now).await?;
        self.refresh_quota(file.user_id).await;

        info!(
            "File moved to trash: {} (ID: {}) by {}",
            file.name,
            file.id,
            actor.label()
        );

        self.get(file_id).await
    }

    /// Take a file out of trash so it counts toward quota again
    pub async fn restore(&self, file_id: Uuid) -> Result<StoredFile> {
        let file = self.get(file_id).await?;
        if !file.is_trashed() {
            return Err(AppError::Conflict(format!("File {} is not in trash", file_id)));
        }

        self.store.restore_file(file_id).await?;
        self.refresh_quota(file.user_id).await;

        info!("File restored from trash: {} (ID: {})", file.name, file.id);

        self.get(file_id).await
    }

    /// Erase a trashed file: object first (best effort), then the row
    pub async fn purge(&self, file_id: Uuid) -> Result<StoredFile> {
        let file = self.get(file_id).await?;
        if !file.is_trashed() {
            return Err(AppError::Conflict(format!(
                "File {} must be in trash before it can be permanently deleted",
                file_id
            )));
        }

        match self.storage.remove(&file.object_key()).await {
            Ok(RemoveOutcome::Removed) | Ok(RemoveOutcome::NotFound) => {}
            Err(e) => warn!(
                "Could not delete file {} from disk: {}",
                file.name, e
            ),
        }

        self.store.permanently_delete_file_record(file_id).await?;
        self.refresh_quota(file.user_id).await;

        info!("Permanently deleted file: {} (ID: {})", file.name, file.id);

        Ok(file)
    }

    async fn refresh_quota(&self, user_id: i64) {
        if let Err(e) = self.quota.refresh(user_id).await {
            warn!("Could not recalculate storage for user {}: {}", user_id, e);
        }
    }
}
