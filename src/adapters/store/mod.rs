//! Counter store adapters.
//!
//! Implementations of the `CounterStore` port:
//!
//! - `MemoryStore` - in-process, for testing and single-server deployments
//! - `RedisStore` - shared, for production multi-server deployments

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;
