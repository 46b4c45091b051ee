//! Integration tests for the admission gate.
//!
//! These tests drive the full axum router with the in-process counter store
//! and verify the end-to-end admission behavior: threshold and blocking,
//! identity precedence, bucket isolation, and the fail policy when the
//! counter store is unavailable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use rategate::adapters::http::{app_router, AdmissionState};
use rategate::adapters::store::MemoryStore;
use rategate::application::Limiter;
use rategate::config::LimitsConfig;
use rategate::ports::{CounterStore, IncrementOutcome, StoreError};

const DENIAL_BODY: &str = r#"{"error": "you have reached the maximum number of requests or actions allowed within a certain time frame"}"#;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn router_with(store: Arc<dyn CounterStore>, limits: LimitsConfig, fail_open: bool) -> Router {
    let limiter = Arc::new(Limiter::new(store, limits));
    app_router(AdmissionState { limiter, fail_open })
}

fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Store whose every operation fails, for exercising the fail policy.
struct UnavailableStore;

#[async_trait]
impl CounterStore for UnavailableStore {
    async fn increment(
        &self,
        _key: &str,
        _window: Duration,
    ) -> Result<IncrementOutcome, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn set_block(&self, _key: &str, _duration: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn is_blocked(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn reset(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

// =============================================================================
// Threshold and Blocking
// =============================================================================

#[tokio::test]
async fn ip_budget_is_enforced_with_the_fixed_denial_body() {
    let limits = LimitsConfig {
        ip_requests_per_second: 5,
        ip_block_seconds: 5,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);
    let ip = [("X-Real-Ip", "203.0.113.9")];

    // Requests 1-5 pass through to the downstream handler.
    for _ in 0..5 {
        let (status, body) = send(&router, get("/", &ip)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"Request successful"}"#);
    }

    // Request 6 crosses the limit.
    let (status, body) = send(&router, get("/", &ip)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, DENIAL_BODY);

    // Request 7 hits the standing block; same response.
    let (status, body) = send(&router, get("/", &ip)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, DENIAL_BODY);
}

#[tokio::test]
async fn reset_restores_admission() {
    let limits = LimitsConfig {
        ip_requests_per_second: 1,
        ..LimitsConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    let router = router_with(store.clone(), limits, false);
    let ip = [("X-Real-Ip", "198.51.100.7")];

    send(&router, get("/", &ip)).await;
    let (status, _) = send(&router, get("/", &ip)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    store.reset("ip:198.51.100.7").await.unwrap();

    let (status, _) = send(&router, get("/", &ip)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Identity Resolution
// =============================================================================

#[tokio::test]
async fn token_budget_ignores_an_exhausted_address_budget() {
    let limits = LimitsConfig {
        ip_requests_per_second: 1,
        token_requests_per_second: 100,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);

    // Exhaust the address bucket.
    let ip_only = [("X-Forwarded-For", "192.0.2.1")];
    send(&router, get("/", &ip_only)).await;
    let (status, _) = send(&router, get("/", &ip_only)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Same address plus a token: limited solely by the token's budget.
    let with_token = [("API_KEY", "abc123"), ("X-Forwarded-For", "192.0.2.1")];
    for _ in 0..10 {
        let (status, _) = send(&router, get("/", &with_token)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn authorization_scheme_token_is_honored() {
    let limits = LimitsConfig {
        token_requests_per_second: 2,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);
    let headers = [("Authorization", "API_KEY secret-token")];

    send(&router, get("/", &headers)).await;
    send(&router, get("/", &headers)).await;
    let (status, body) = send(&router, get("/", &headers)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, DENIAL_BODY);
}

#[tokio::test]
async fn distinct_addresses_have_independent_budgets() {
    let limits = LimitsConfig {
        ip_requests_per_second: 1,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);

    let first = [("X-Real-Ip", "192.0.2.1")];
    send(&router, get("/", &first)).await;
    let (status, _) = send(&router, get("/", &first)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let second = [("X-Real-Ip", "192.0.2.2")];
    let (status, _) = send(&router, get("/", &second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_override_limit_governs_the_threshold() {
    let limits = LimitsConfig {
        token_requests_per_second: 100,
        ..LimitsConfig::default()
    };
    let store = Arc::new(MemoryStore::new());
    store
        .override_limits()
        .unwrap()
        .set_override_limit("small-quota", 2)
        .await
        .unwrap();
    let router = router_with(store, limits, false);
    let headers = [("API_KEY", "small-quota")];

    send(&router, get("/", &headers)).await;
    send(&router, get("/", &headers)).await;
    let (status, _) = send(&router, get("/", &headers)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn requests_without_any_origin_share_one_bucket() {
    let limits = LimitsConfig {
        ip_requests_per_second: 1,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);

    let (status, _) = send(&router, get("/", &[])).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, get("/", &[])).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Fail Policy and Health
// =============================================================================

#[tokio::test]
async fn store_outage_fails_closed_by_default() {
    let router = router_with(Arc::new(UnavailableStore), LimitsConfig::default(), false);

    let (status, _) = send(&router, get("/", &[("X-Real-Ip", "192.0.2.1")])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn store_outage_admits_traffic_when_fail_open() {
    let router = router_with(Arc::new(UnavailableStore), LimitsConfig::default(), true);

    let (status, body) = send(&router, get("/", &[("X-Real-Ip", "192.0.2.1")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Request successful"}"#);
}

#[tokio::test]
async fn health_probe_is_never_rate_limited() {
    let limits = LimitsConfig {
        ip_requests_per_second: 1,
        ..LimitsConfig::default()
    };
    let router = router_with(Arc::new(MemoryStore::new()), limits, false);

    for _ in 0..5 {
        let (status, _) = send(&router, get("/healthz", &[("X-Real-Ip", "10.0.0.1")])).await;
        assert_eq!(status, StatusCode::OK);
    }
}
