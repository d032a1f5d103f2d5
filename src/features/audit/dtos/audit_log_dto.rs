use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::audit::models::{AuditLogEntry, AuditLogFilter};
use crate::shared::actor::Actor;
use crate::shared::types::PaginationQuery;

/// Query parameters for the audit trail listing
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
pub struct AuditLogQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 20, max: 100)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Only entries with this action, e.g. `FILE_DELETED`
    #[validate(length(min = 1, max = 64, message = "action must be 1-64 characters"))]
    #[param(example = "LOGIN_FAILED")]
    pub action: Option<String>,
}

fn default_page() -> i64 {
    PaginationQuery::default().page
}

fn default_page_size() -> i64 {
    PaginationQuery::default().page_size
}

impl AuditLogQuery {
    pub fn to_filter(&self) -> AuditLogFilter {
        let pagination = PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        };

        AuditLogFilter {
            action: self.action.clone(),
            offset: pagination.offset(),
            limit: pagination.limit(),
        }
    }
}

/// Response DTO for an audit entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditLogResponseDto {
    pub id: i64,
    pub actor: Actor,
    /// Convenience copy of the actor's display label
    pub actor_label: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogEntry> for AuditLogResponseDto {
    fn from(entry: AuditLogEntry) -> Self {
        Self {
            id: entry.id,
            actor_label: entry.actor.label().to_string(),
            actor: entry.actor,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            details: entry.details,
            success: entry.success,
            error_message: entry.error_message,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: entry.created_at,
        }
    }
}
