use std::sync::Arc;
use tracing::debug;

use crate::core::error::Result;
use crate::features::files::stores::FileLifecycleStore;

/// Storage quota calculator.
///
/// Quota is always recomputed from the files table, never adjusted
/// incrementally, so a missed refresh heals on the next transition.
pub struct QuotaService {
    store: Arc<dyn FileLifecycleStore>,
}

impl QuotaService {
    pub fn new(store: Arc<dyn FileLifecycleStore>) -> Self {
        Self { store }
    }

    /// Total size of the user's files that are not in trash
    pub async fn compute(&self, user_id: i64) -> Result<i64> {
        self.store.compute_live_storage_for_user(user_id).await
    }

    /// Recompute the user's usage and persist it
    pub async fn refresh(&self, user_id: i64) -> Result<i64> {
        let bytes = self.compute(user_id).await?;
        self.store.set_user_storage_usage(user_id, bytes).await?;

        debug!("Storage usage for user {} recalculated: {} bytes", user_id, bytes);

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{file_for, InMemoryFileStore, MB};
    use chrono::Utc;

    #[tokio::test]
    async fn test_compute_excludes_trashed_files() {
        let now = Utc::now();
        let store = Arc::new(InMemoryFileStore::new());
        store.insert(file_for(1, 10 * MB, None));
        store.insert(file_for(1, 20 * MB, None).trashed_at(now));
        store.insert(file_for(2, 99 * MB, None));

        let service = QuotaService::new(store.clone());

        assert_eq!(service.compute(1).await.unwrap(), 10 * MB);
        assert_eq!(service.compute(3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refresh_persists_usage() {
        let store = Arc::new(InMemoryFileStore::new());
        store.insert(file_for(5, 3 * MB, None));
        store.insert(file_for(5, 4 * MB, None));
        store.set_usage(5, 0);

        let service = QuotaService::new(store.clone());

        assert_eq!(service.refresh(5).await.unwrap(), 7 * MB);
        assert_eq!(store.usage(5), Some(7 * MB));
    }

    #[tokio::test]
    async fn test_refresh_for_unknown_user_fails() {
        let store = Arc::new(InMemoryFileStore::new());
        let service = QuotaService::new(store);

        assert!(service.refresh(404).await.is_err());
    }
}
