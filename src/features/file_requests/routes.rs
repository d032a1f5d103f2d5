use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::file_requests::handlers;
use crate::features::file_requests::services::FileRequestService;

/// Public routes for upload-request links
pub fn routes(service: Arc<FileRequestService>) -> Router {
    Router::new()
        .route(
            "/api/upload-requests/{token}",
            get(handlers::get_upload_request),
        )
        .with_state(service)
}
