use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::audit::handlers;
use crate::features::audit::services::AuditLogger;

/// Audit routes, nested under `/api/admin`
pub fn routes(logger: Arc<AuditLogger>) -> Router {
    Router::new()
        .route("/audit-logs", get(handlers::list_audit_logs))
        .with_state(logger)
}
