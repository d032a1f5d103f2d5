use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::FileLifecycleStore;
use crate::core::error::{AppError, Result};
use crate::features::files::models::StoredFile;
use crate::shared::actor::Actor;

const FILE_COLUMNS: &str = "id, user_id, name, size_bytes, created_at, expires_at, \
     deleted_at, deleted_by_kind, deleted_by";

/// PostgreSQL-backed file lifecycle store
pub struct PgFileLifecycleStore {
    pool: PgPool,
}

impl PgFileLifecycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileLifecycleStore for PgFileLifecycleStore {
    async fn find_file(&self, file_id: Uuid) -> Result<Option<StoredFile>> {
        let file = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {} FROM files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_expired_active_files(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>> {
        let files = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE expires_at IS NOT NULL
              AND expires_at < $1
              AND deleted_at IS NULL
            ORDER BY expires_at ASC
            "#,
            FILE_COLUMNS
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn find_trashed_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<StoredFile>> {
        let files = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE deleted_at IS NOT NULL
              AND deleted_at < $1
            ORDER BY deleted_at ASC
            "#,
            FILE_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn list_trashed(&self, user_id: Option<i64>) -> Result<Vec<StoredFile>> {
        let files = sqlx::query_as::<_, StoredFile>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE deleted_at IS NOT NULL
              AND ($1::bigint IS NULL OR user_id = $1)
            ORDER BY deleted_at DESC
            "#,
            FILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn soft_delete_file(
        &self,
        file_id: Uuid,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE files
            SET deleted_at = $2, deleted_by_kind = $3, deleted_by = $4
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(file_id)
        .bind(at)
        .bind(actor.kind())
        .bind(actor.user_id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "File {} not found or already in trash",
                file_id
            )));
        }

        Ok(())
    }

    async fn restore_file(&self, file_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE files
            SET deleted_at = NULL, deleted_by_kind = NULL, deleted_by = NULL
            WHERE id = $1 AND deleted_at IS NOT NULL
            "#,
        )
        .bind(file_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "File {} not found in trash",
                file_id
            )));
        }

        Ok(())
    }

    async fn permanently_delete_file_record(&self, file_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }

        Ok(())
    }

    async fn compute_live_storage_for_user(&self, user_id: i64) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(size_bytes), 0)::BIGINT
            FROM files
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn set_user_storage_usage(&self, user_id: i64, bytes: i64) -> Result<()> {
        let result = sqlx::query("UPDATE users SET storage_used_bytes = $2 WHERE id = $1")
            .bind(user_id)
            .bind(bytes)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        Ok(())
    }
}
