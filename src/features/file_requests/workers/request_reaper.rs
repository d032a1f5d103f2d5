use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::file_requests::stores::FileRequestStore;
use crate::shared::constants::FILE_REQUEST_GRACE_DAYS;
use crate::shared::time::days_before;

/// Deletes upload requests once they have been expired for longer than the
/// grace window. Until then the upload page can still say the link expired.
pub struct RequestReaper {
    store: Arc<dyn FileRequestStore>,
}

impl RequestReaper {
    pub fn new(store: Arc<dyn FileRequestStore>) -> Self {
        Self { store }
    }

    pub async fn tick(&self) -> Option<u64> {
        match self.reap(Utc::now()).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!("Error cleaning up expired file requests: {}", e);
                None
            }
        }
    }

    pub async fn reap(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = days_before(now, FILE_REQUEST_GRACE_DAYS);
        let deleted = self.store.delete_expired_before(cutoff).await?;

        if deleted > 0 {
            tracing::info!("Cleaned up {} expired file requests", deleted);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::features::file_requests::models::{generate_request_token, NewFileRequest};
    use crate::shared::test_helpers::InMemoryFileRequestStore;

    async fn seed(store: &InMemoryFileRequestStore, expires_at: Option<DateTime<Utc>>) -> String {
        store
            .create(&NewFileRequest {
                user_id: 1,
                request_token: generate_request_token(),
                title: "Drop box".to_string(),
                expires_at,
                ..Default::default()
            })
            .await
            .unwrap()
            .request_token
    }

    #[tokio::test]
    async fn test_request_survives_grace_window() {
        let t = Utc::now();
        let store = Arc::new(InMemoryFileRequestStore::new());
        let token = seed(&store, Some(t)).await;

        let reaper = RequestReaper::new(store.clone());

        assert_eq!(reaper.reap(t + Duration::days(9)).await.unwrap(), 0);
        assert!(store.find_by_token(&token).await.unwrap().is_some());

        assert_eq!(reaper.reap(t + Duration::days(11)).await.unwrap(), 1);
        assert!(store.find_by_token(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_never_expiring_request_is_kept() {
        let store = Arc::new(InMemoryFileRequestStore::new());
        let token = seed(&store, None).await;

        let deleted = RequestReaper::new(store.clone())
            .reap(Utc::now() + Duration::days(365))
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert!(store.find_by_token(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_none_on_tick() {
        let store = Arc::new(InMemoryFileRequestStore::new());
        store.fail_deletes();

        assert_eq!(RequestReaper::new(store).tick().await, None);
    }
}
