//! Admission gate middleware for axum.
//!
//! Resolves exactly one identity per request and asks the limiter for a
//! verdict. A token (from the `API_KEY` header, or an `Authorization` header
//! carrying the `API_KEY ` scheme) fully overrides address-based limiting —
//! when a token is present the client address is not checked at all. With no
//! token, the address comes from `X-Real-Ip`, else the first entry of
//! `X-Forwarded-For`, else the transport peer address.
//!
//! Denials are answered with a fixed 429 body; the two denial reasons are
//! distinguished only in logs. Store failures fail closed (500) unless the
//! fail-open override is configured.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::application::Limiter;
use crate::domain::Identity;

/// Header carrying an API token directly.
const TOKEN_HEADER: &str = "API_KEY";
/// Scheme prefix recognized in the Authorization header.
const TOKEN_SCHEME: &str = "API_KEY ";

/// Fixed body returned for every denial, regardless of reason.
const DENIAL_BODY: &str = r#"{"error": "you have reached the maximum number of requests or actions allowed within a certain time frame"}"#;

/// Shared state for the admission middleware.
#[derive(Clone)]
pub struct AdmissionState {
    /// The policy engine requests are checked against.
    pub limiter: Arc<Limiter>,
    /// Admit traffic when the counter store is unavailable. Defaults to
    /// false: an outage rejects rather than silently lifting all limits.
    pub fail_open: bool,
}

/// Per-request admission check.
///
/// Allowed requests pass through unchanged; denied requests short-circuit
/// with the fixed 429 response.
pub async fn admission_middleware(
    State(state): State<AdmissionState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(request.headers(), connect_info.as_ref());

    match state.limiter.check_identity(&identity).await {
        Ok(verdict) if verdict.is_allowed() => next.run(request).await,
        Ok(verdict) => {
            debug!(identity = %identity, reason = %verdict.reason, "request denied");
            denial_response()
        }
        Err(e) if state.fail_open => {
            warn!(error = %e, "counter store unavailable, admitting request");
            next.run(request).await
        }
        Err(e) => {
            error!(error = %e, "counter store unavailable, rejecting request");
            store_error_response()
        }
    }
}

/// Resolve the single identity this request is limited on.
///
/// Token presence wins outright; otherwise the client address, falling back
/// to an empty-string address bucket when no origin can be derived.
fn resolve_identity(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Identity {
    if let Some(token) = extract_token(headers) {
        return Identity::token(token);
    }
    Identity::address(extract_client_address(headers, connect_info).unwrap_or_default())
}

/// Extract an API token from the dedicated header or the Authorization
/// scheme. Empty values count as absent.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok()) {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let token = auth.strip_prefix(TOKEN_SCHEME)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Derive the client address: `X-Real-Ip`, else the first entry of
/// `X-Forwarded-For`, else the peer address with the port stripped.
fn extract_client_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    if let Some(real_ip) = headers.get("X-Real-Ip").and_then(|h| h.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return Some(real_ip.to_string());
        }
    }

    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

/// The fixed 429 response for a denied request.
fn denial_response() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::CONTENT_TYPE, "application/json")],
        DENIAL_BODY,
    )
        .into_response()
}

/// Minimal 500 response when the counter store fails.
fn store_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}
