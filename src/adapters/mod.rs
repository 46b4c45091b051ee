//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the limiting core to external systems:
//! - `store` - counter store backends (in-memory, Redis)
//! - `http` - the axum admission gate

pub mod http;
pub mod store;
