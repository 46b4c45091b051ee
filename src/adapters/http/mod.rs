//! HTTP adapter - the request-facing admission gate.

mod middleware;
mod routes;

pub use middleware::{admission_middleware, AdmissionState};
pub use routes::app_router;
