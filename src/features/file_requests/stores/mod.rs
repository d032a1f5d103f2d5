mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;
use crate::features::file_requests::models::{FileRequest, NewFileRequest};

pub use postgres::PgFileRequestStore;

#[async_trait]
pub trait FileRequestStore: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<FileRequest>>;

    async fn create(&self, request: &NewFileRequest) -> Result<FileRequest>;

    /// Delete requests whose expiry is set and earlier than `cutoff`
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
