use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::client_ip;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Span per request carrying the request id and the proxied client address
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        let client = client_ip(request.headers(), "");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            client = %client,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Authenticated operator of the maintenance API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    pub username: String,
}

/// HTTP basic auth guard for maintenance routes.
///
/// `credentials` is the expected `username:password` pair.
pub async fn admin_auth_middleware(
    State(credentials): State<Arc<String>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let decoded = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .and_then(|encoded| BASE64_STANDARD.decode(encoded.trim()).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed credentials".to_string()))?;

    if decoded != *credentials {
        tracing::warn!("Rejected maintenance API credentials");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let username = decoded
        .split_once(':')
        .map(|(user, _)| user.to_string())
        .unwrap_or_default();
    req.extensions_mut().insert(AdminPrincipal { username });

    Ok(next.run(req).await)
}
