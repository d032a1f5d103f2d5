use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::core::error::AppError;
use crate::core::middleware::AdminPrincipal;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Client details captured from an inbound request for the audit trail
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Build a context from request headers and the raw peer address
    /// (`host:port` as reported by the listener, if known).
    pub fn from_headers(headers: &HeaderMap, remote_addr: Option<&str>) -> Self {
        let ip = client_ip(headers, remote_addr.unwrap_or_default());
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            ip_address: (!ip.is_empty()).then_some(ip),
            user_agent,
        }
    }
}

/// Resolve the client IP.
///
/// Order matters for compatibility with existing audit records:
/// 1. first entry of `X-Forwarded-For`
/// 2. `X-Real-IP`
/// 3. the raw peer address with its trailing `:port` removed
pub fn client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    if let Some(xff) = header_str(headers, X_FORWARDED_FOR) {
        let first = match xff.find(',') {
            Some(idx) => &xff[..idx],
            None => xff,
        };
        return first.trim().to_string();
    }

    if let Some(real_ip) = header_str(headers, X_REAL_IP) {
        return real_ip.trim().to_string();
    }

    match remote_addr.rfind(':') {
        Some(idx) => remote_addr[..idx].to_string(),
        None => remote_addr.to_string(),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string());

        Ok(RequestContext::from_headers(
            &parts.headers,
            remote_addr.as_deref(),
        ))
    }
}

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminPrincipal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
