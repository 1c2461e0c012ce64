//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `INTERVIEWS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use feedback_interviews::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod error;
mod orchestrator;
mod rate_limiter;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use database::{DatabaseConfig, StoreBackend};
pub use error::{ConfigError, ValidationError};
pub use orchestrator::OrchestratorConfig;
pub use rate_limiter::RateLimiterConfig;
pub use server::{Environment, ServerConfig, MIN_BODY_LIMIT_BYTES};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; absent URL means in-memory storage
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Turn generator configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Turn pipeline tunables
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Rate limiter housekeeping
    #[serde(default)]
    pub rate_limiter: RateLimiterConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `INTERVIEWS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `INTERVIEWS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `INTERVIEWS__DATABASE__URL=...` -> `database.url = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTERVIEWS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.ai.validate()?;
        self.orchestrator.validate()?;
        self.rate_limiter.validate()?;
        if self.server.request_timeout() <= self.orchestrator.generation_timeout() {
            return Err(ValidationError::RequestTimeoutTooShort);
        }
        if self.is_production() && self.database.url().is_none() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
