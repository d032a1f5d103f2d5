use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::middleware::AdminPrincipal;
use crate::features::audit::dtos::{AuditLogQuery, AuditLogResponseDto};
use crate::features::audit::services::AuditLogger;
use crate::shared::types::{ApiResponse, Meta};

/// List audit entries, newest first (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit trail page", body = ApiResponse<Vec<AuditLogResponseDto>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "audit",
    security(("basic_auth" = []))
)]
pub async fn list_audit_logs(
    _admin: AdminPrincipal,
    State(logger): State<Arc<AuditLogger>>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogResponseDto>>>> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (entries, total) = logger.list_entries(&query.to_filter()).await?;
    let dtos: Vec<AuditLogResponseDto> = entries.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::audit::routes::routes;
    use crate::shared::test_helpers::{with_admin_auth, InMemoryAuditStore};
    use axum::http::StatusCode;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::Value;

    async fn server() -> TestServer {
        let logger = Arc::new(AuditLogger::new(Arc::new(InMemoryAuditStore::new())));
        logger
            .log_login_attempt("ada@example.com", true, None, Some(1), None)
            .await
            .unwrap();
        logger
            .log_login_attempt("ghost@example.com", false, None, None, Some("unknown email"))
            .await
            .unwrap();

        let app = Router::new().nest("/api/admin", with_admin_auth(routes(logger)));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_lists_newest_first() {
        let response = server().await.get("/api/admin/audit-logs").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["action"], "LOGIN_FAILED");
        assert_eq!(body["data"][0]["actor"]["kind"], "anonymous");
        assert_eq!(body["data"][1]["actor_label"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_filters_by_action() {
        let response = server()
            .await
            .get("/api/admin/audit-logs")
            .add_query_param("action", "LOGIN_SUCCESS")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["success"], true);
    }

    #[tokio::test]
    async fn test_rejects_oversized_page() {
        let response = server()
            .await
            .get("/api/admin/audit-logs")
            .add_query_param("page_size", 500)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
