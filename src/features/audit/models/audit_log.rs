use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::extractor::RequestContext;
use crate::shared::actor::Actor;

/// Fixed per-row overhead used when estimating an entry's stored size
/// outside of Postgres (tuple header, id, timestamps, flags).
const ROW_OVERHEAD_BYTES: i64 = 64;

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    // Authentication
    LoginSuccess,
    LoginFailed,
    Logout,
    PasswordChanged,
    TwoFactorEnabled,
    TwoFactorDisabled,

    // Files
    FileUploaded,
    FileDeleted,
    FileRestored,
    FilePermanentlyDeleted,
    FileDownloaded,
    FileSharedWithTeam,

    // User management
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserActivated,
    UserDeactivated,

    // Teams
    TeamCreated,
    TeamMemberAdded,
    TeamMemberRemoved,

    // System
    SettingsUpdated,
    RetentionRun,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::LoginSuccess => "LOGIN_SUCCESS",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::Logout => "LOGOUT",
            AuditAction::PasswordChanged => "PASSWORD_CHANGED",
            AuditAction::TwoFactorEnabled => "TWO_FACTOR_ENABLED",
            AuditAction::TwoFactorDisabled => "TWO_FACTOR_DISABLED",
            AuditAction::FileUploaded => "FILE_UPLOADED",
            AuditAction::FileDeleted => "FILE_DELETED",
            AuditAction::FileRestored => "FILE_RESTORED",
            AuditAction::FilePermanentlyDeleted => "FILE_PERMANENTLY_DELETED",
            AuditAction::FileDownloaded => "FILE_DOWNLOADED",
            AuditAction::FileSharedWithTeam => "FILE_SHARED_WITH_TEAM",
            AuditAction::UserCreated => "USER_CREATED",
            AuditAction::UserUpdated => "USER_UPDATED",
            AuditAction::UserDeleted => "USER_DELETED",
            AuditAction::UserActivated => "USER_ACTIVATED",
            AuditAction::UserDeactivated => "USER_DEACTIVATED",
            AuditAction::TeamCreated => "TEAM_CREATED",
            AuditAction::TeamMemberAdded => "TEAM_MEMBER_ADDED",
            AuditAction::TeamMemberRemoved => "TEAM_MEMBER_REMOVED",
            AuditAction::SettingsUpdated => "SETTINGS_UPDATED",
            AuditAction::RetentionRun => "RETENTION_RUN",
        }
    }
}

/// What kind of thing an audit entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    File,
    User,
    Team,
    Session,
    Settings,
    System,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::File => "file",
            EntityType::User => "user",
            EntityType::Team => "team",
            EntityType::Session => "session",
            EntityType::Settings => "settings",
            EntityType::System => "system",
        }
    }
}

/// A persisted audit record. Rows are never updated; eviction removes them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: i64,
    pub actor: Actor,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub success: bool,
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Write-side audit record builder
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLogEntry {
    pub actor: Actor,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: serde_json::Value,
    pub success: bool,
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAuditLogEntry {
    pub fn new(actor: Actor, action: AuditAction, entity_type: EntityType) -> Self {
        Self {
            actor,
            action: action.as_str().to_string(),
            entity_type: entity_type.as_str().to_string(),
            entity_id: String::new(),
            details: serde_json::Value::Object(Default::default()),
            success: true,
            error_message: None,
            ip_address: None,
            user_agent: None,
            created_at: Utc::now(),
        }
    }

    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = entity_id.into();
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn request(mut self, ctx: &RequestContext) -> Self {
        self.ip_address = ctx.ip_address.clone();
        self.user_agent = ctx.user_agent.clone();
        self
    }

    /// Record the outcome. The message is dropped for successful actions.
    pub fn outcome(mut self, success: bool, error_message: Option<&str>) -> Self {
        self.success = success;
        self.error_message = if success {
            None
        } else {
            error_message
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        };
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Approximate stored size in bytes, for stores without a native measure
    pub fn estimated_size(&self) -> i64 {
        let text = self.actor.kind().len()
            + self.actor.label().len()
            + self.action.len()
            + self.entity_type.len()
            + self.entity_id.len()
            + self.details.to_string().len()
            + self.error_message.as_deref().map_or(0, str::len)
            + self.ip_address.as_deref().map_or(0, str::len)
            + self.user_agent.as_deref().map_or(0, str::len);

        ROW_OVERHEAD_BYTES + text as i64
    }
}

/// Listing filter for the audit trail
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub action: Option<String>,
    pub offset: i64,
    pub limit: i64,
}
