//! Persistence contract for the audit trail.

mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::audit::models::{AuditLogEntry, AuditLogFilter, NewAuditLogEntry};

pub use postgres::PgAuditLogStore;

#[async_trait]
pub trait AuditLogStore: Send + Sync {
    /// Persist an entry and return its id
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64>;

    /// Newest first, with the total number of matching rows
    async fn list(&self, filter: &AuditLogFilter) -> Result<(Vec<AuditLogEntry>, i64)>;

    /// Combined stored size of all entries, in bytes
    async fn total_size(&self) -> Result<i64>;

    /// Delete entries created before `cutoff`
    async fn delete_entries_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Keep the newest entries whose cumulative size fits in `max_bytes` and
    /// delete everything older
    async fn delete_oldest_until_under_size(&self, max_bytes: i64) -> Result<u64>;
}
