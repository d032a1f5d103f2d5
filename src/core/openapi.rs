use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::audit::{
    dtos as audit_dtos, handlers as audit_handlers, workers as audit_workers,
};
use crate::features::file_requests::{
    dtos as file_requests_dtos, handlers as file_requests_handlers,
    models as file_requests_models,
};
use crate::features::files::{
    dtos as files_dtos, handlers as files_handlers, workers as files_workers,
};
use crate::features::maintenance::{dtos as maintenance_dtos, handlers as maintenance_handlers};
use crate::shared::actor::Actor;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Upload requests (public)
        file_requests_handlers::get_upload_request,
        // Trash (admin)
        files_handlers::list_trash,
        files_handlers::restore_file,
        files_handlers::purge_file,
        // Audit (admin)
        audit_handlers::list_audit_logs,
        // Maintenance (admin)
        maintenance_handlers::run_file_maintenance,
        maintenance_handlers::run_audit_maintenance,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Actor,
            // Upload requests
            file_requests_models::FileRequestStatus,
            file_requests_dtos::FileRequestLookupDto,
            ApiResponse<file_requests_dtos::FileRequestLookupDto>,
            // Trash
            files_dtos::TrashedFileDto,
            ApiResponse<Vec<files_dtos::TrashedFileDto>>,
            ApiResponse<files_dtos::TrashedFileDto>,
            // Audit
            audit_dtos::AuditLogResponseDto,
            ApiResponse<Vec<audit_dtos::AuditLogResponseDto>>,
            // Maintenance
            files_workers::ExpirePassReport,
            files_workers::PurgePassReport,
            files_workers::FileRetentionReport,
            audit_workers::AuditRetentionReport,
            maintenance_dtos::FileMaintenanceRunDto,
            maintenance_dtos::AuditMaintenanceRunDto,
            ApiResponse<maintenance_dtos::FileMaintenanceRunDto>,
            ApiResponse<maintenance_dtos::AuditMaintenanceRunDto>,
        )
    ),
    tags(
        (name = "file-requests", description = "Public upload-request links"),
        (name = "trash", description = "Trashed file management (admin only)"),
        (name = "audit", description = "Audit trail (admin only)"),
        (name = "maintenance", description = "On-demand retention runs (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sharekeep API",
        version = "0.1.0",
        description = "Retention and lifecycle API for Sharekeep",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP basic security scheme used by admin routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}
