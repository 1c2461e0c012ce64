//! Durable store settings
//!
//! Sessions and their turn logs live in PostgreSQL when a URL is set and in
//! process memory otherwise.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where sessions and turn logs are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend<'a> {
    InMemory,
    Postgres { url: &'a str },
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds a request waits for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply the embedded interview schema on startup
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Blank URLs count as unset.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn backend(&self) -> StoreBackend<'_> {
        match self.url() {
            Some(url) => StoreBackend::Postgres { url },
            None => StoreBackend::InMemory,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let StoreBackend::Postgres { url } = self.backend() else {
            return Ok(());
        };
        if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_run_migrations() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgres(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_or_blank_url_selects_memory_store() {
        assert_eq!(DatabaseConfig::default().backend(), StoreBackend::InMemory);
        assert_eq!(postgres("   ").backend(), StoreBackend::InMemory);
        assert!(postgres("   ").validate().is_ok());
    }

    #[test]
    fn url_selects_postgres_and_is_trimmed() {
        let config = postgres(" postgres://app@db/interviews ");
        assert_eq!(
            config.backend(),
            StoreBackend::Postgres {
                url: "postgres://app@db/interviews"
            }
        );
        assert!(config.validate().is_ok());
        assert!(config.run_migrations);
    }

    #[test]
    fn non_postgres_scheme_is_rejected() {
        assert_eq!(
            postgres("mysql://localhost/interviews").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn pool_bounds_are_checked_only_with_a_database() {
        let inverted = DatabaseConfig {
            min_connections: 20,
            max_connections: 5,
            ..postgres("postgresql://localhost/interviews")
        };
        assert_eq!(inverted.validate(), Err(ValidationError::InvalidPoolSize));

        let oversized = DatabaseConfig {
            max_connections: 150,
            ..postgres("postgresql://localhost/interviews")
        };
        assert_eq!(oversized.validate(), Err(ValidationError::PoolSizeTooLarge));

        let in_memory = DatabaseConfig {
            max_connections: 0,
            ..Default::default()
        };
        assert!(in_memory.validate().is_ok());
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let config = DatabaseConfig {
            acquire_timeout_secs: 0,
            ..postgres("postgresql://localhost/interviews")
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        assert_eq!(postgres("postgres://x/y").acquire_timeout(), Duration::from_secs(5));
    }
}
