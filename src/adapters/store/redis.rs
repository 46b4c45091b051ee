//! Redis-backed counter store for multi-server deployments.
//!
//! Uses INCR + EXPIRE NX inside a MULTI pipeline so a window's count and
//! expiry are indivisible from the perspective of other clients, and the
//! expiry is pinned to the first increment of the window. Block markers are
//! plain keys with a TTL. Every round-trip is bounded by a configured
//! timeout; a partition surfaces as `StoreError::Unavailable` instead of
//! hanging the calling request.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

use crate::ports::{CounterStore, IncrementOutcome, OverrideLimits, StoreError};

/// Redis implementation of [`CounterStore`] and [`OverrideLimits`].
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis at `url`.
    ///
    /// The same `timeout` bounds the connection attempt and every later
    /// operation.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| StoreError::Unavailable("connection attempt timed out".to_string()))?
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { conn, timeout })
    }

    fn block_key(key: &str) -> String {
        format!("block:{key}")
    }

    fn override_key(identifier: &str) -> String {
        format!("token_limit:{identifier}")
    }

    /// Run one store operation under the configured time bound.
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Unavailable(format!(
                "operation timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment(
        &self,
        key: &str,
        window: Duration,
    ) -> Result<IncrementOutcome, StoreError> {
        if self.is_blocked(key).await? {
            return Ok(IncrementOutcome::Blocked);
        }

        let mut conn = self.conn.clone();
        let key = key.to_string();
        let window_secs = window.as_secs().max(1);
        let count = self
            .bounded(async move {
                let (count,): (u64,) = redis::pipe()
                    .atomic()
                    .cmd("INCR")
                    .arg(&key)
                    .cmd("EXPIRE")
                    .arg(&key)
                    .arg(window_secs)
                    .arg("NX")
                    .ignore()
                    .query_async(&mut conn)
                    .await?;
                Ok(count)
            })
            .await?;

        Ok(IncrementOutcome::Counted(count))
    }

    async fn set_block(&self, key: &str, duration: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let block_key = Self::block_key(key);
        let block_secs = duration.as_secs().max(1);
        self.bounded(async move {
            redis::cmd("SET")
                .arg(&block_key)
                .arg(1)
                .arg("EX")
                .arg(block_secs)
                .query_async(&mut conn)
                .await
        })
        .await
    }

    async fn is_blocked(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let block_key = Self::block_key(key);
        self.bounded(async move { conn.exists(&block_key).await })
            .await
    }

    async fn reset(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = key.to_string();
        let block_key = Self::block_key(&key);
        self.bounded(async move {
            redis::pipe()
                .atomic()
                .cmd("DEL")
                .arg(&key)
                .ignore()
                .cmd("DEL")
                .arg(&block_key)
                .ignore()
                .query_async(&mut conn)
                .await
        })
        .await
    }

    fn override_limits(&self) -> Option<&dyn OverrideLimits> {
        Some(self)
    }
}

#[async_trait]
impl OverrideLimits for RedisStore {
    async fn get_override_limit(&self, identifier: &str) -> Result<Option<u32>, StoreError> {
        let mut conn = self.conn.clone();
        let override_key = Self::override_key(identifier);
        self.bounded(async move { conn.get(&override_key).await })
            .await
    }

    async fn set_override_limit(&self, identifier: &str, limit: u32) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let override_key = Self::override_key(identifier);
        self.bounded(async move { conn.set(&override_key, limit).await })
            .await
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
