//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is loaded
//! with the `RATEGATE` prefix and nested values use double underscores as
//! separators. Every option has a sensible default, so the service runs with
//! zero configuration.
//!
//! # Example
//!
//! ```no_run
//! use rategate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod limits;
mod redis;
mod server;

pub use error::{ConfigError, ValidationError};
pub use limits::LimitsConfig;
pub use redis::RedisConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (bind address, fail policy)
    #[serde(default)]
    pub server: ServerConfig,

    /// Default rate limits per identity kind
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Redis configuration (shared counter store)
    #[serde(default)]
    pub redis: RedisConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `RATEGATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `RATEGATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `RATEGATE__LIMITS__IP_REQUESTS_PER_SECOND=10`
    /// - `RATEGATE__REDIS__URL=redis://localhost:6379`
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("RATEGATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.limits.validate()?;
        self.redis.validate()?;
        Ok(())
    }
}
