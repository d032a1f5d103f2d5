use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::core::error::Result;
use crate::features::file_requests::dtos::FileRequestLookupDto;
use crate::features::file_requests::services::FileRequestService;
use crate::shared::types::ApiResponse;

/// Resolve an upload-request link
///
/// Expired requests are still answered, with status `expired`, until they
/// are cleaned up.
#[utoipa::path(
    get,
    path = "/api/upload-requests/{token}",
    params(
        ("token" = String, Path, description = "Request token from the upload link")
    ),
    responses(
        (status = 200, description = "Upload request details", body = ApiResponse<FileRequestLookupDto>),
        (status = 404, description = "Unknown or removed request")
    ),
    tag = "file-requests"
)]
pub async fn get_upload_request(
    State(service): State<Arc<FileRequestService>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<FileRequestLookupDto>>> {
    let (request, status) = service.lookup(&token, Utc::now()).await?;
    let upload_url = service.upload_url(&request);

    Ok(Json(ApiResponse::success(
        Some(FileRequestLookupDto::new(request, status, upload_url)),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::file_requests::models::NewFileRequest;
    use crate::features::file_requests::routes::routes;
    use crate::shared::test_helpers::InMemoryFileRequestStore;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Duration;
    use serde_json::Value;

    async fn server_with(expires_at: Option<chrono::DateTime<Utc>>) -> (TestServer, String) {
        let store = Arc::new(InMemoryFileRequestStore::new());
        let service = Arc::new(FileRequestService::new(store, "https://files.example.com"));
        let created = service
            .create(NewFileRequest {
                user_id: 1,
                title: "Contracts".to_string(),
                allowed_file_types: ".pdf".to_string(),
                expires_at,
                ..Default::default()
            })
            .await
            .unwrap();

        (TestServer::new(routes(service)).unwrap(), created.request_token)
    }

    #[tokio::test]
    async fn test_active_request_is_resolved() {
        let (server, token) = server_with(None).await;

        let response = server.get(&format!("/api/upload-requests/{}", token)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "active");
        assert_eq!(body["data"]["allowed_file_types"][0], ".pdf");
        assert_eq!(
            body["data"]["upload_url"],
            format!("https://files.example.com/upload-request/{}", token)
        );
    }

    #[tokio::test]
    async fn test_expired_request_still_answers() {
        let (server, token) = server_with(Some(Utc::now() - Duration::days(2))).await;

        let response = server.get(&format!("/api/upload-requests/{}", token)).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "expired");
    }

    #[tokio::test]
    async fn test_unknown_token_is_404() {
        let (server, _) = server_with(None).await;

        let response = server.get("/api/upload-requests/ffffffffffffffff").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }
}
