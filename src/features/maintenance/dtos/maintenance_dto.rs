use serde::Serialize;
use utoipa::ToSchema;

use crate::features::audit::AuditRetentionReport;
use crate::features::files::workers::FileRetentionReport;

/// Result of an on-demand file maintenance run
#[derive(Debug, Serialize, ToSchema)]
pub struct FileMaintenanceRunDto {
    pub retention: FileRetentionReport,
    /// Upload requests removed after their grace window; `None` if the
    /// cleanup failed
    pub requests_deleted: Option<u64>,
}

/// Result of an on-demand audit retention run
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditMaintenanceRunDto {
    pub retention: AuditRetentionReport,
}
