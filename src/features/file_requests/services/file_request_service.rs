use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::file_requests::models::{
    generate_request_token, FileRequest, FileRequestStatus, NewFileRequest,
};
use crate::features::file_requests::stores::FileRequestStore;

/// Resolves upload-request links for the public upload page
pub struct FileRequestService {
    store: Arc<dyn FileRequestStore>,
    server_url: String,
}

impl FileRequestService {
    pub fn new(store: Arc<dyn FileRequestStore>, server_url: impl Into<String>) -> Self {
        Self {
            store,
            server_url: server_url.into(),
        }
    }

    /// Find a request by token. Expired requests are still returned (with
    /// their status) until the reaper removes them.
    pub async fn lookup(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(FileRequest, FileRequestStatus)> {
        let request = self
            .store
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("File request not found".to_string()))?;

        let status = request.status_at(now);
        Ok((request, status))
    }

    #[allow(dead_code)]
    pub async fn create(&self, mut request: NewFileRequest) -> Result<FileRequest> {
        if request.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        if request.request_token.is_empty() {
            request.request_token = generate_request_token();
        }

        let created = self.store.create(&request).await?;
        tracing::info!(
            "File request created: {} (ID: {}) for user {}",
            created.title,
            created.id,
            created.user_id
        );

        Ok(created)
    }

    pub fn upload_url(&self, request: &FileRequest) -> String {
        request.upload_url(&self.server_url)
    }
}
