//! Application layer - the rate limiting policy engine.
//!
//! Orchestrates the counter store port; all transport concerns live in the
//! HTTP adapter.

mod limiter;

pub use limiter::Limiter;
