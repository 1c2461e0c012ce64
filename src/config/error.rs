//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host address: {0}")]
    InvalidHost(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Timeouts must be at least one second")]
    InvalidTimeout,

    #[error("Request timeout must exceed the generation timeout")]
    RequestTimeoutTooShort,

    #[error("Request body limit must be at least {0} bytes")]
    BodyLimitTooSmall(usize),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool needs max_connections >= min_connections and at least one connection")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Generation timeout must be between 1 and 300 seconds")]
    InvalidGenerationTimeout,

    #[error("Transcript window must keep at least 2 turns")]
    TranscriptWindowTooSmall,

    #[error("Temperature must be between 0 and 2")]
    InvalidTemperature,

    #[error("Rate limiter GC interval must be positive")]
    InvalidGcInterval,
}
