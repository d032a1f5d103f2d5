use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::core::config::{positive_or_default, retention_days_or_default};
use crate::features::audit::stores::AuditLogStore;
use crate::shared::constants::{DEFAULT_AUDIT_LOG_MAX_SIZE_MB, DEFAULT_AUDIT_LOG_RETENTION_DAYS};
use crate::shared::time::days_before;

const BYTES_PER_MB: i64 = 1024 * 1024;

/// Rows removed by each policy; `None` when that policy failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuditRetentionReport {
    pub deleted_by_age: Option<u64>,
    pub deleted_by_size: Option<u64>,
}

/// Bounds the audit trail by age and then by total size.
pub struct AuditRetentionWorker {
    store: Arc<dyn AuditLogStore>,
    retention_days: i64,
    max_size_mb: i64,
}

impl AuditRetentionWorker {
    pub fn new(store: Arc<dyn AuditLogStore>, retention_days: i64, max_size_mb: i64) -> Self {
        Self {
            store,
            retention_days: retention_days_or_default(
                retention_days,
                DEFAULT_AUDIT_LOG_RETENTION_DAYS,
            ),
            max_size_mb: positive_or_default(max_size_mb, DEFAULT_AUDIT_LOG_MAX_SIZE_MB),
        }
    }

    pub fn retention_days(&self) -> i64 {
        self.retention_days
    }

    pub fn max_size_bytes(&self) -> i64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }

    pub async fn tick(&self) -> AuditRetentionReport {
        self.run_once(Utc::now()).await
    }

    /// Age policy, then size policy. A failing policy does not stop the other.
    pub async fn run_once(&self, now: DateTime<Utc>) -> AuditRetentionReport {
        let cutoff = days_before(now, self.retention_days);

        let deleted_by_age = match self.store.delete_entries_older_than(cutoff).await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(
                        "Audit log cleanup: deleted {} entries older than {} days",
                        count,
                        self.retention_days
                    );
                } else {
                    tracing::debug!("Audit log cleanup: no entries older than {} days", self.retention_days);
                }
                Some(count)
            }
            Err(e) => {
                tracing::error!("Failed to clean up old audit logs: {}", e);
                None
            }
        };

        let deleted_by_size = match self
            .store
            .delete_oldest_until_under_size(self.max_size_bytes())
            .await
        {
            Ok(count) => {
                if count > 0 {
                    tracing::info!(
                        "Audit log cleanup: deleted {} entries to stay under {} MB",
                        count,
                        self.max_size_mb
                    );
                } else {
                    tracing::debug!("Audit log cleanup: size within {} MB", self.max_size_mb);
                }
                Some(count)
            }
            Err(e) => {
                tracing::error!("Failed to clean up audit logs by size: {}", e);
                None
            }
        };

        AuditRetentionReport {
            deleted_by_age,
            deleted_by_size,
        }
    }
}
