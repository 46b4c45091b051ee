//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the limiting core and the outside world. Adapters implement these ports.
//!
//! - `CounterStore` - window counters and block markers
//! - `OverrideLimits` - optional per-identifier quota capability

mod counter_store;

pub use counter_store::{CounterStore, IncrementOutcome, OverrideLimits, StoreError};
