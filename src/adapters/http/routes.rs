//! Router assembly.
//!
//! Application routes sit behind the admission layer; the health probe is
//! added after it so orchestration checks are never rate limited.

use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use super::middleware::{admission_middleware, AdmissionState};

/// Build the service router with the admission gate applied.
pub fn app_router(state: AdmissionState) -> Router {
    Router::new()
        .route("/", get(root))
        .layer(middleware::from_fn_with_state(state, admission_middleware))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "Request successful"}))
}

async fn healthz() -> impl IntoResponse {
    axum::http::StatusCode::OK
}
