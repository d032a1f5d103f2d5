use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::features::file_requests::models::{FileRequest, FileRequestStatus};

/// What the public upload page needs to render a request link
#[derive(Debug, Serialize, ToSchema)]
pub struct FileRequestLookupDto {
    pub title: String,
    pub message: String,
    pub status: FileRequestStatus,
    pub expires_at: Option<DateTime<Utc>>,
    /// 0 means no per-file limit
    pub max_file_size_mb: i64,
    pub allowed_file_types: Vec<String>,
    pub upload_url: String,
}

impl FileRequestLookupDto {
    pub fn new(request: FileRequest, status: FileRequestStatus, upload_url: String) -> Self {
        let allowed_file_types = request
            .allowed_file_types
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            title: request.title,
            message: request.message,
            status,
            expires_at: request.expires_at,
            max_file_size_mb: request.max_file_size_mb,
            allowed_file_types,
            upload_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_are_split_and_trimmed() {
        let request = FileRequest {
            id: 1,
            user_id: 1,
            request_token: "abc".to_string(),
            title: "Scans".to_string(),
            message: String::new(),
            created_at: Utc::now(),
            expires_at: None,
            is_active: true,
            max_file_size_mb: 50,
            allowed_file_types: ".pdf, .jpg,,".to_string(),
        };

        let dto = FileRequestLookupDto::new(request, FileRequestStatus::Active, "u".to_string());
        assert_eq!(dto.allowed_file_types, vec![".pdf", ".jpg"]);
    }
}
