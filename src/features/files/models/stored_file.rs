use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::actor::Actor;
use crate::shared::constants::DELETED_USER_LABEL;

/// A file row. The id doubles as the on-disk object name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub user_id: i64,
    pub name: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
    /// `None` means the file never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Set once the file is in trash; only live files count toward quota
    pub deleted_at: Option<DateTime<Utc>>,
    /// `user` or `system` while the file is in trash
    pub deleted_by_kind: Option<String>,
    /// Trashing user; `None` for the system and after that user is removed
    pub deleted_by: Option<i64>,
}

/// Lifecycle stage derived from the two timestamps.
///
/// Permanently deleted files have no row, so they have no state either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Active,
    Expired,
    Trashed,
}

impl StoredFile {
    pub fn state_at(&self, now: DateTime<Utc>) -> FileState {
        if self.deleted_at.is_some() {
            FileState::Trashed
        } else if self.is_expired_at(now) {
            FileState::Expired
        } else {
            FileState::Active
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the file still counts toward its owner's quota
    pub fn counts_toward_quota(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn trashed_by_system(&self) -> bool {
        self.deleted_at.is_some() && self.deleted_by_kind.as_deref() == Some("system")
    }

    /// Who moved the file to trash, decided by `deleted_by_kind`.
    ///
    /// The label of a user actor is not stored on the file, so it falls back
    /// to the numeric id. A user who has since been removed comes back as an
    /// anonymous actor, never as the system.
    pub fn deleted_by_actor(&self) -> Option<Actor> {
        self.deleted_at?;
        let label = match self.deleted_by {
            Some(id) => id.to_string(),
            None => DELETED_USER_LABEL.to_string(),
        };
        Some(Actor::from_columns(
            self.deleted_by_kind.as_deref().unwrap_or_default(),
            self.deleted_by,
            &label,
        ))
    }

    /// Key of the stored bytes in object storage
    pub fn object_key(&self) -> String {
        self.id.to_string()
    }
}
