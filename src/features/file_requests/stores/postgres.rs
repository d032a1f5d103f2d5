use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::FileRequestStore;
use crate::core::error::Result;
use crate::features::file_requests::models::{FileRequest, NewFileRequest};

const REQUEST_COLUMNS: &str = "id, user_id, request_token, title, message, created_at, \
     expires_at, is_active, max_file_size_mb, allowed_file_types";

pub struct PgFileRequestStore {
    pool: PgPool,
}

impl PgFileRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRequestStore for PgFileRequestStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<FileRequest>> {
        let request = sqlx::query_as::<_, FileRequest>(&format!(
            "SELECT {} FROM file_requests WHERE request_token = $1",
            REQUEST_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn create(&self, request: &NewFileRequest) -> Result<FileRequest> {
        let created = sqlx::query_as::<_, FileRequest>(&format!(
            r#"
            INSERT INTO file_requests (
                user_id, request_token, title, message, expires_at,
                max_file_size_mb, allowed_file_types
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(request.user_id)
        .bind(&request.request_token)
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.expires_at)
        .bind(request.max_file_size_mb)
        .bind(&request.allowed_file_types)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM file_requests WHERE expires_at IS NOT NULL AND expires_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
