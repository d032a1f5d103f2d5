use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::files::models::StoredFile;
use crate::shared::actor::Actor;

/// Query parameters for the trash listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TrashQuery {
    /// Only files owned by this user
    pub user_id: Option<i64>,
}

/// Response DTO for a file in trash
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrashedFileDto {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who moved the file to trash
    pub deleted_by: Option<Actor>,
}

impl From<StoredFile> for TrashedFileDto {
    fn from(file: StoredFile) -> Self {
        Self {
            deleted_by: file.deleted_by_actor(),
            id: file.id,
            user_id: file.user_id,
            name: file.name,
            size_bytes: file.size_bytes,
            created_at: file.created_at,
            expires_at: file.expires_at,
            deleted_at: file.deleted_at,
        }
    }
}
