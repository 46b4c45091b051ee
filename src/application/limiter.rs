//! The rate limiting policy engine.
//!
//! Applies the fixed-window-then-block algorithm against whichever
//! `CounterStore` it was constructed with: the first `limit` requests inside
//! a one-second window pass, the request that crosses the limit installs a
//! block marker, and every request after that is denied until the block
//! expires or the key is reset.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::LimitsConfig;
use crate::domain::{Identity, Reason, Verdict};
use crate::ports::{CounterStore, IncrementOutcome, StoreError};

/// The counting window. One second per check, making `limit` a
/// requests-per-second budget independent of the block duration.
const WINDOW: Duration = Duration::from_secs(1);

/// Policy engine over a [`CounterStore`].
///
/// Cheap to share behind an `Arc`; all state lives in the store.
pub struct Limiter {
    store: Arc<dyn CounterStore>,
    limits: LimitsConfig,
}

impl Limiter {
    /// Create a limiter over `store` with the configured default limits.
    pub fn new(store: Arc<dyn CounterStore>, limits: LimitsConfig) -> Self {
        Self { store, limits }
    }

    /// Run one rate limit check for `key` against `limit`.
    ///
    /// Store failures abort the check and surface as errors, never as
    /// verdicts; the admission gate decides what to do with them.
    pub async fn check(
        &self,
        key: &str,
        limit: u32,
        block_duration: Duration,
    ) -> Result<Verdict, StoreError> {
        if self.store.is_blocked(key).await? {
            return Ok(Verdict::denied(Reason::Blocked));
        }

        match self.store.increment(key, WINDOW).await? {
            // A block was installed between the check above and the
            // increment; honor it.
            IncrementOutcome::Blocked => Ok(Verdict::denied(Reason::Blocked)),
            IncrementOutcome::Counted(count) if count > u64::from(limit) => {
                self.store.set_block(key, block_duration).await?;
                debug!(key, count, limit, "limit exceeded, block installed");
                Ok(Verdict::denied(Reason::LimitExceeded))
            }
            IncrementOutcome::Counted(_) => Ok(Verdict::allowed()),
        }
    }

    /// Check `identity` using the limits configured for its kind.
    ///
    /// Token identities may carry a per-token override quota; the override
    /// applies to the limit only, never to the block duration.
    pub async fn check_identity(&self, identity: &Identity) -> Result<Verdict, StoreError> {
        let key = identity.storage_key();
        match identity {
            Identity::Address(_) => {
                self.check(
                    &key,
                    self.limits.ip_requests_per_second,
                    self.limits.ip_block(),
                )
                .await
            }
            Identity::Token(token) => {
                let limit = self
                    .override_limit_for(token)
                    .await
                    .unwrap_or(self.limits.token_requests_per_second);
                self.check(&key, limit, self.limits.token_block()).await
            }
        }
    }

    /// Resolve a positive override quota for `token`, if the store supports
    /// overrides and one is installed. Lookup failures fall back silently.
    async fn override_limit_for(&self, token: &str) -> Option<u32> {
        let overrides = self.store.override_limits()?;
        match overrides.get_override_limit(token).await {
            Ok(Some(limit)) if limit > 0 => Some(limit),
            Ok(_) => None,
            Err(e) => {
                debug!(token, error = %e, "override lookup failed, using default limit");
                None
            }
        }
    }
}
