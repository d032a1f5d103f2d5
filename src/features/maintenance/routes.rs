use axum::{routing::post, Router};

use crate::features::maintenance::handlers::{
    run_audit_maintenance, run_file_maintenance, MaintenanceState,
};

/// Maintenance routes, nested under `/api/admin`
pub fn routes(state: MaintenanceState) -> Router {
    Router::new()
        .route("/maintenance/files/run", post(run_file_maintenance))
        .route("/maintenance/audit/run", post(run_audit_maintenance))
        .with_state(state)
}
