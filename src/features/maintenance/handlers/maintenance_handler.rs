use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::core::error::Result;
use crate::core::extractor::RequestContext;
use crate::core::middleware::AdminPrincipal;
use crate::features::audit::models::{AuditAction, EntityType};
use crate::features::audit::{AuditLogger, AuditRetentionWorker};
use crate::features::file_requests::RequestReaper;
use crate::features::files::FileRetentionWorker;
use crate::features::maintenance::dtos::{AuditMaintenanceRunDto, FileMaintenanceRunDto};
use crate::shared::actor::Actor;
use crate::shared::types::ApiResponse;

/// State for maintenance handlers
#[derive(Clone)]
pub struct MaintenanceState {
    pub file_retention: Arc<FileRetentionWorker>,
    pub request_reaper: Arc<RequestReaper>,
    pub audit_retention: Arc<AuditRetentionWorker>,
    pub audit: Arc<AuditLogger>,
}

impl MaintenanceState {
    /// Runs are recorded as system actions naming the operator who asked
    async fn record_run(&self, ctx: &RequestContext, target: &str, details: Value) {
        if let Err(e) = self
            .audit
            .log_action(
                &Actor::System,
                AuditAction::RetentionRun,
                EntityType::System,
                target,
                details,
                Some(ctx),
                true,
                None,
            )
            .await
        {
            tracing::warn!("Failed to record maintenance run: {}", e);
        }
    }
}

/// Run file retention and upload-request cleanup now
#[utoipa::path(
    post,
    path = "/api/admin/maintenance/files/run",
    responses(
        (status = 200, description = "Run completed", body = ApiResponse<FileMaintenanceRunDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "maintenance",
    security(("basic_auth" = []))
)]
pub async fn run_file_maintenance(
    admin: AdminPrincipal,
    ctx: RequestContext,
    State(state): State<MaintenanceState>,
) -> Result<Json<ApiResponse<FileMaintenanceRunDto>>> {
    tracing::info!("Manual file maintenance requested by {}", admin.username);

    let now = Utc::now();
    let retention = state.file_retention.run_once(now).await;
    let requests_deleted = match state.request_reaper.reap(now).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::error!("Error cleaning up expired file requests: {}", e);
            None
        }
    };

    state
        .record_run(
            &ctx,
            "files",
            json!({
                "operator": admin.username,
                "trashed": retention.expired.as_ref().map(|r| r.trashed),
                "purged": retention.purged.as_ref().map(|r| r.purged),
                "requests_deleted": requests_deleted,
            }),
        )
        .await;

    Ok(Json(ApiResponse::success(
        Some(FileMaintenanceRunDto {
            retention,
            requests_deleted,
        }),
        Some("File maintenance completed".to_string()),
        None,
    )))
}

/// Run audit log retention now
#[utoipa::path(
    post,
    path = "/api/admin/maintenance/audit/run",
    responses(
        (status = 200, description = "Run completed", body = ApiResponse<AuditMaintenanceRunDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "maintenance",
    security(("basic_auth" = []))
)]
pub async fn run_audit_maintenance(
    admin: AdminPrincipal,
    ctx: RequestContext,
    State(state): State<MaintenanceState>,
) -> Result<Json<ApiResponse<AuditMaintenanceRunDto>>> {
    tracing::info!("Manual audit retention requested by {}", admin.username);

    let retention = state.audit_retention.run_once(Utc::now()).await;

    // Written after eviction so the record itself is never evicted by the run
    state
        .record_run(
            &ctx,
            "audit_logs",
            json!({
                "operator": admin.username,
                "deleted_by_age": retention.deleted_by_age,
                "deleted_by_size": retention.deleted_by_size,
            }),
        )
        .await;

    Ok(Json(ApiResponse::success(
        Some(AuditMaintenanceRunDto { retention }),
        Some("Audit retention completed".to_string()),
        None,
    )))
}
