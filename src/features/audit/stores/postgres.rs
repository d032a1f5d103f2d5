use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::AuditLogStore;
use crate::core::error::Result;
use crate::features::audit::models::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};
use crate::shared::actor::Actor;

#[derive(Debug, FromRow)]
struct AuditLogRow {
    id: i64,
    actor_kind: String,
    user_id: Option<i64>,
    actor_label: String,
    action: String,
    entity_type: String,
    entity_id: String,
    details: Json<serde_json::Value>,
    success: bool,
    error_message: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditLogEntry {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: row.id,
            actor: Actor::from_columns(&row.actor_kind, row.user_id, &row.actor_label),
            action: row.action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            details: row.details.0,
            success: row.success,
            error_message: row.error_message,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed audit trail. Entry size is the stored row size as
/// reported by `pg_column_size`.
pub struct PgAuditLogStore {
    pool: PgPool,
}

impl PgAuditLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogStore for PgAuditLogStore {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_logs (
                actor_kind, user_id, actor_label, action, entity_type, entity_id,
                details, success, error_message, ip_address, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(entry.actor.kind())
        .bind(entry.actor.user_id())
        .bind(entry.actor.label())
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(Json(&entry.details))
        .bind(entry.success)
        .bind(&entry.error_message)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLogEntry>, i64)> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT id, actor_kind, user_id, actor_label, action, entity_type, entity_id,
                   details, success, error_message, ip_address, user_agent, created_at
            FROM audit_logs
            WHERE ($1::text IS NULL OR action = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&filter.action)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM audit_logs WHERE ($1::text IS NULL OR action = $1)",
        )
        .bind(&filter.action)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(AuditLogEntry::from).collect(), total))
    }

    async fn total_size(&self) -> Result<i64> {
        let size = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(pg_column_size(a.*)), 0)::BIGINT FROM audit_logs a",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(size)
    }

    async fn delete_entries_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM audit_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_oldest_until_under_size(&self, max_bytes: i64) -> Result<u64> {
        // Running total from the newest entry backwards; everything past the
        // ceiling goes.
        let result = sqlx::query(
            r#"
            DELETE FROM audit_logs
            WHERE id IN (
                SELECT id FROM (
                    SELECT id,
                           SUM(pg_column_size(a.*)) OVER (
                               ORDER BY created_at DESC, id DESC
                           ) AS running_size
                    FROM audit_logs a
                ) r
                WHERE running_size > $1
            )
            "#,
        )
        .bind(max_bytes)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
