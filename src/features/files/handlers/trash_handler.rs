use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::RequestContext;
use crate::core::middleware::AdminPrincipal;
use crate::features::audit::models::{AuditAction, EntityType};
use crate::features::audit::AuditLogger;
use crate::features::files::dtos::{TrashQuery, TrashedFileDto};
use crate::features::files::models::StoredFile;
use crate::features::files::services::FileLifecycleService;
use crate::shared::actor::Actor;
use crate::shared::types::{ApiResponse, Meta};

/// State for trash handlers
#[derive(Clone)]
pub struct TrashState {
    pub lifecycle: Arc<FileLifecycleService>,
    pub audit: Arc<AuditLogger>,
}

/// Record an operator action on a file. Audit failures never fail the request.
async fn audit_operator_action(
    audit: &AuditLogger,
    admin: &AdminPrincipal,
    ctx: &RequestContext,
    action: AuditAction,
    file: &StoredFile,
) {
    let details = json!({ "file_name": file.name, "operator": admin.username });
    if let Err(e) = audit
        .log_action(
            &Actor::System,
            action,
            EntityType::File,
            &file.id.to_string(),
            details,
            Some(ctx),
            true,
            None,
        )
        .await
    {
        tracing::warn!("Failed to record audit entry for file {}: {}", file.id, e);
    }
}

/// List files in trash
#[utoipa::path(
    get,
    path = "/api/admin/trash",
    params(TrashQuery),
    responses(
        (status = 200, description = "Trashed files, most recently deleted first", body = ApiResponse<Vec<TrashedFileDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "trash",
    security(("basic_auth" = []))
)]
pub async fn list_trash(
    _admin: AdminPrincipal,
    State(state): State<TrashState>,
    Query(query): Query<TrashQuery>,
) -> Result<Json<ApiResponse<Vec<TrashedFileDto>>>> {
    let files = state.lifecycle.list_trash(query.user_id).await?;
    let total = files.len() as i64;
    let dtos: Vec<TrashedFileDto> = files.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Restore a file from trash
#[utoipa::path(
    post,
    path = "/api/admin/trash/{id}/restore",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File restored", body = ApiResponse<TrashedFileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 409, description = "File is not in trash")
    ),
    tag = "trash",
    security(("basic_auth" = []))
)]
pub async fn restore_file(
    admin: AdminPrincipal,
    ctx: RequestContext,
    State(state): State<TrashState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrashedFileDto>>> {
    let file = state.lifecycle.restore(id).await?;
    audit_operator_action(&state.audit, &admin, &ctx, AuditAction::FileRestored, &file).await;

    Ok(Json(ApiResponse::success(
        Some(file.into()),
        Some("File restored".to_string()),
        None,
    )))
}

/// Permanently delete a trashed file
#[utoipa::path(
    delete,
    path = "/api/admin/trash/{id}",
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File permanently deleted", body = ApiResponse<TrashedFileDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found"),
        (status = 409, description = "File is not in trash")
    ),
    tag = "trash",
    security(("basic_auth" = []))
)]
pub async fn purge_file(
    admin: AdminPrincipal,
    ctx: RequestContext,
    State(state): State<TrashState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TrashedFileDto>>> {
    let file = state.lifecycle.purge(id).await?;
    audit_operator_action(
        &state.audit,
        &admin,
        &ctx,
        AuditAction::FilePermanentlyDeleted,
        &file,
    )
    .await;

    Ok(Json(ApiResponse::success(
        Some(file.into()),
        Some("File permanently deleted".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::audit::models::AuditAction;
    use crate::features::files::routes::routes;
    use crate::features::files::services::QuotaService;
    use crate::shared::test_helpers::{
        file_for, with_admin_auth, InMemoryAuditStore, InMemoryFileStore, MockObjectStorage, MB,
        TEST_ADMIN,
    };
    use axum::http::StatusCode;
    use axum::Router;
    use axum_test::TestServer;
    use chrono::Utc;
    use serde_json::Value;

    struct Harness {
        server: TestServer,
        files: Arc<InMemoryFileStore>,
        audit: Arc<InMemoryAuditStore>,
    }

    fn harness() -> Harness {
        let files = Arc::new(InMemoryFileStore::new());
        let audit = Arc::new(InMemoryAuditStore::new());
        let lifecycle = Arc::new(FileLifecycleService::new(
            files.clone(),
            Arc::new(MockObjectStorage::new()),
            Arc::new(QuotaService::new(files.clone())),
        ));
        let state = TrashState {
            lifecycle,
            audit: Arc::new(AuditLogger::new(audit.clone())),
        };
        let app = Router::new().nest("/api/admin", with_admin_auth(routes(state)));

        Harness {
            server: TestServer::new(app).unwrap(),
            files,
            audit,
        }
    }

    #[tokio::test]
    async fn test_list_trash_filters_by_owner() {
        let h = harness();
        h.files.insert(file_for(1, MB, None).trashed_at(Utc::now()));
        h.files.insert(file_for(2, MB, None).trashed_at(Utc::now()));
        h.files.insert(file_for(1, MB, None));

        let response = h.server.get("/api/admin/trash").add_query_param("user_id", 1).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["user_id"], 1);
        assert_eq!(body["data"][0]["deleted_by"]["kind"], "system");
    }

    #[tokio::test]
    async fn test_list_trash_keeps_removed_user_apart_from_system() {
        let h = harness();
        let now = Utc::now();
        h.files.insert(
            file_for(4, MB, None)
                .trashed_by_user(4, now)
                .with_deleting_user_removed(),
        );
        h.files.insert(file_for(4, MB, None).trashed_by_user(4, now));
        h.files.insert(file_for(4, MB, None).trashed_at(now));

        let response = h.server.get("/api/admin/trash").add_query_param("user_id", 4).await;

        response.assert_status_ok();
        let body: Value = response.json();
        let mut kinds: Vec<String> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["deleted_by"]["kind"].as_str().unwrap().to_string())
            .collect();
        kinds.sort();
        assert_eq!(kinds, vec!["anonymous", "system", "user"]);
    }

    #[tokio::test]
    async fn test_restore_is_audited() {
        let h = harness();
        let id = h.files.insert(file_for(1, MB, None).trashed_at(Utc::now()));
        h.files.set_usage(1, 0);

        let response = h
            .server
            .post(&format!("/api/admin/trash/{}/restore", id))
            .await;

        response.assert_status_ok();
        assert!(!h.files.get(id).unwrap().is_trashed());
        assert_eq!(h.files.usage(1), Some(MB));

        let entries = h.audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::FileRestored.as_str());
        assert_eq!(entries[0].details["operator"], TEST_ADMIN);
    }

    #[tokio::test]
    async fn test_purge_of_live_file_conflicts() {
        let h = harness();
        let id = h.files.insert(file_for(1, MB, None));

        let response = h.server.delete(&format!("/api/admin/trash/{}", id)).await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(h.files.get(id).is_some());
        assert!(h.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn test_purge_removes_trashed_file() {
        let h = harness();
        let id = h.files.insert(file_for(1, MB, None).trashed_at(Utc::now()));
        h.files.set_usage(1, 0);

        let response = h.server.delete(&format!("/api/admin/trash/{}", id)).await;

        response.assert_status_ok();
        assert!(h.files.get(id).is_none());
        assert_eq!(
            h.audit.entries()[0].action,
            AuditAction::FilePermanentlyDeleted.as_str()
        );
    }
}
