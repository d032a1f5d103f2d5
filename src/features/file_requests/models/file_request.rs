use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A public "upload files to me" link owned by a user
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct FileRequest {
    pub id: i64,
    pub user_id: i64,
    pub request_token: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the request never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub max_file_size_mb: i64,
    /// Comma-separated extensions; empty allows everything
    pub allowed_file_types: String,
}

/// Write-side shape; the token is generated when left empty
#[derive(Debug, Clone, Default)]
pub struct NewFileRequest {
    pub user_id: i64,
    pub request_token: String,
    pub title: String,
    pub message: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_file_size_mb: i64,
    pub allowed_file_types: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileRequestStatus {
    Active,
    /// Past its expiry but still inside the grace window
    Expired,
    /// Switched off by its owner
    Inactive,
}

impl FileRequest {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> FileRequestStatus {
        if self.is_expired_at(now) {
            FileRequestStatus::Expired
        } else if !self.is_active {
            FileRequestStatus::Inactive
        } else {
            FileRequestStatus::Active
        }
    }

    /// Public link handed out to uploaders
    pub fn upload_url(&self, server_url: &str) -> String {
        format!("{}/upload-request/{}", server_url, self.request_token)
    }
}

/// 32 hex characters from 16 random bytes
pub fn generate_request_token() -> String {
    hex::encode(Uuid::new_v4().as_bytes())
}
