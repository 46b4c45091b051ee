//! Counter store port for admission control state.
//!
//! The limiter runs the same algorithm against any backend that implements
//! this contract: an in-process store for single-server deployments and
//! testing, or Redis for multi-server deployments. The store is the sole
//! arbiter of atomicity for `increment` — concurrent increments on the same
//! key must serialize with no lost updates.

use async_trait::async_trait;
use std::time::Duration;

/// Outcome of an increment attempt.
///
/// A blocked key is reported as its own variant rather than a magic count so
/// callers cannot confuse the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// The counter was incremented; carries the new count for the window.
    Counted(u64),
    /// The key is currently blocked; the counter was not touched.
    Blocked,
}

/// Port for window counters and block markers.
///
/// Implementations must be safe under arbitrary concurrent invocation.
/// Counters and block markers are created lazily and expire via time-to-live;
/// no caller-driven garbage collection is required.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the counter for `key`.
    ///
    /// If the key is blocked, returns [`IncrementOutcome::Blocked`] without
    /// mutating the counter. Otherwise increments and returns the new count;
    /// the expiry is set to `window` from now on the first increment of a
    /// window only.
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<IncrementOutcome, StoreError>;

    /// Mark `key` blocked for `duration`.
    ///
    /// Idempotent: calling again overwrites the block expiry.
    async fn set_block(&self, key: &str, duration: Duration) -> Result<(), StoreError>;

    /// True iff an unexpired block marker exists for `key`.
    ///
    /// An expired marker is treated as absent.
    async fn is_blocked(&self, key: &str) -> Result<bool, StoreError>;

    /// Unconditionally clear both the counter and the block marker for `key`.
    ///
    /// Administrative/test operation, never called on the request path.
    async fn reset(&self, key: &str) -> Result<(), StoreError>;

    /// Access the per-identifier override quota table, when supported.
    ///
    /// Override support is an optional capability; backends that do not carry
    /// an override table return `None` and callers fall back to configured
    /// defaults.
    fn override_limits(&self) -> Option<&dyn OverrideLimits> {
        None
    }
}

/// Optional capability: per-identifier custom quotas.
///
/// Installed out-of-band (administrative action) and read at check time.
#[async_trait]
pub trait OverrideLimits: Send + Sync {
    /// Look up a custom quota for `identifier`.
    ///
    /// `None` or a zero value means "no override, use the default".
    async fn get_override_limit(&self, identifier: &str) -> Result<Option<u32>, StoreError>;

    /// Install a custom quota for `identifier`.
    async fn set_override_limit(&self, identifier: &str, limit: u32) -> Result<(), StoreError>;
}

/// Errors that can occur during store operations.
///
/// Store failures propagate to the caller; mapping them to an allow or deny
/// decision is the admission gate's policy, never the store's.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not complete the operation
    /// (connectivity loss, timeout).
    #[error("counter store unavailable: {0}")]
    Unavailable(String),
}
