//! Rate limit configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Default limits and block durations per identity kind.
///
/// Limits are requests per second; block durations are the cooldown applied
/// once a budget is exceeded within one window.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Requests per second allowed per client address.
    #[serde(default = "default_ip_rps")]
    pub ip_requests_per_second: u32,

    /// Seconds an address stays blocked after exceeding its budget.
    #[serde(default = "default_ip_block_seconds")]
    pub ip_block_seconds: u64,

    /// Requests per second allowed per token, absent an override.
    #[serde(default = "default_token_rps")]
    pub token_requests_per_second: u32,

    /// Seconds a token stays blocked after exceeding its budget.
    /// Override limits never change this.
    #[serde(default = "default_token_block_seconds")]
    pub token_block_seconds: u64,
}

impl LimitsConfig {
    /// Address block duration.
    pub fn ip_block(&self) -> Duration {
        Duration::from_secs(self.ip_block_seconds)
    }

    /// Token block duration.
    pub fn token_block(&self) -> Duration {
        Duration::from_secs(self.token_block_seconds)
    }

    /// Validate limits configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ip_requests_per_second == 0 {
            return Err(ValidationError::ZeroLimit("ip_requests_per_second"));
        }
        if self.token_requests_per_second == 0 {
            return Err(ValidationError::ZeroLimit("token_requests_per_second"));
        }
        if self.ip_block_seconds == 0 {
            return Err(ValidationError::ZeroBlockDuration("ip_block_seconds"));
        }
        if self.token_block_seconds == 0 {
            return Err(ValidationError::ZeroBlockDuration("token_block_seconds"));
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            ip_requests_per_second: default_ip_rps(),
            ip_block_seconds: default_ip_block_seconds(),
            token_requests_per_second: default_token_rps(),
            token_block_seconds: default_token_block_seconds(),
        }
    }
}

fn default_ip_rps() -> u32 {
    10
}

fn default_ip_block_seconds() -> u64 {
    300
}

fn default_token_rps() -> u32 {
    100
}

fn default_token_block_seconds() -> u64 {
    300
}
