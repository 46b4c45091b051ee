//! In-process counter store for testing and single-server deployments.
//!
//! Counters, block markers, and override limits live in RwLock-guarded maps.
//! Expiry is lazy: expired entries are ignored by readers and removed when
//! the next write touches them. Not suitable for multi-server deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::ports::{CounterStore, IncrementOutcome, OverrideLimits, StoreError};

/// In-process implementation of [`CounterStore`].
///
/// Each instance owns its own state, so independently configured limiters can
/// coexist in one process. Writers take the exclusive lock; readers never
/// observe a partially applied write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    counters: HashMap<String, Window>,
    blocks: HashMap<String, Instant>,
    override_limits: HashMap<String, u32>,
}

/// A single fixed window for one key.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    expires_at: Instant,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<IncrementOutcome, StoreError> {
        let now = Instant::now();
        let mut state = self.state.write().await;

        // A live block short-circuits; an expired one is cleaned up here.
        if let Some(&until) = state.blocks.get(key) {
            if now < until {
                return Ok(IncrementOutcome::Blocked);
            }
            state.blocks.remove(key);
        }

        let entry = state.counters.entry(key.to_string()).or_insert(Window {
            count: 0,
            expires_at: now + window,
        });
        if now >= entry.expires_at {
            // First increment of a fresh window.
            entry.count = 0;
            entry.expires_at = now + window;
        }
        entry.count += 1;

        Ok(IncrementOutcome::Counted(entry.count))
    }

    async fn set_block(&self, key: &str, duration: Duration) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .blocks
            .insert(key.to_string(), Instant::now() + duration);
        Ok(())
    }

    async fn is_blocked(&self, key: &str) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .blocks
            .get(key)
            .is_some_and(|&until| Instant::now() < until))
    }

    async fn reset(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.counters.remove(key);
        state.blocks.remove(key);
        Ok(())
    }

    fn override_limits(&self) -> Option<&dyn OverrideLimits> {
        Some(self)
    }
}

#[async_trait]
impl OverrideLimits for MemoryStore {
    async fn get_override_limit(&self, identifier: &str) -> Result<Option<u32>, StoreError> {
        let state = self.state.read().await;
        Ok(state.override_limits.get(identifier).copied())
    }

    async fn set_override_limit(&self, identifier: &str, limit: u32) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.override_limits.insert(identifier.to_string(), limit);
        Ok(())
    }
}
