//! HTTP listener settings for the interview API

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::interview::MAX_CONTENT_LENGTH;

use super::error::ValidationError;

/// Smallest body limit that still fits a maximal respondent turn
/// (four UTF-8 bytes per character plus the JSON envelope).
pub const MIN_BODY_LIMIT_BYTES: usize = MAX_CONTENT_LENGTH * 4 + 1024;

/// Listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Log filter directive, used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whole-request budget in seconds. A send holds its request open while
    /// the interviewer turn is generated, so this must outlast generation.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Browser origins allowed to call the API (comma-separated)
    pub cors_origins: Option<String>,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidHost(self.host.clone()))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Outside production an in-memory run gets a demo invitation.
    pub fn seeds_demo_interview(&self) -> bool {
        !self.is_production()
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.body_limit_bytes < MIN_BODY_LIMIT_BYTES {
            return Err(ValidationError::BodyLimitTooSmall(MIN_BODY_LIMIT_BYTES));
        }
        self.socket_addr()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,feedback_interviews=debug,sqlx=warn,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    90
}

fn default_body_limit() -> usize {
    64 * 1024
}
