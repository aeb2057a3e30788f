//! # Core Configuration Module
//!
//! Provides configuration management for the music catalog core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding the database location, connection pool limits, catalog
//! defaults and the logging setup. `build()` validates eagerly so a bad value
//! fails at startup instead of on the first query.
//!
//! ## Usage
//!
//! ### Builder
//!
//! ```
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/mango/catalog.db")
//!     .max_connections(10)
//!     .default_trending_days(14)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.max_connections, 10);
//! ```
//!
//! ### Environment
//!
//! ```ignore
//! // MANGO_DATABASE_PATH=/var/lib/mango/catalog.db MANGO_LOG_LEVEL=debug
//! let config = CoreConfig::from_env()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the SQLite database file path
pub const ENV_DATABASE_PATH: &str = "MANGO_DATABASE_PATH";
/// Environment variable holding the pool size
pub const ENV_MAX_CONNECTIONS: &str = "MANGO_MAX_CONNECTIONS";
/// Environment variable holding the default trending window in days
pub const ENV_TRENDING_DAYS: &str = "MANGO_TRENDING_DAYS";
/// Environment variable holding the minimum log level
pub const ENV_LOG_LEVEL: &str = "MANGO_LOG_LEVEL";
/// Environment variable holding the log output format
pub const ENV_LOG_FORMAT: &str = "MANGO_LOG_FORMAT";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const MAX_CONNECTIONS_LIMIT: u32 = 100;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TRENDING_DAYS: i32 = 7;

/// Core configuration for the music catalog.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Path to the SQLite database file, `None` for an in-memory database
    pub database_path: Option<PathBuf>,

    /// Maximum number of pooled database connections
    pub max_connections: u32,

    /// Maximum time to wait for a pooled connection
    pub acquire_timeout: Duration,

    /// Trending window used when the caller does not pick one
    pub default_trending_days: i32,

    /// Logging setup
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Create a new configuration builder
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Build a configuration from `MANGO_*` environment variables.
    ///
    /// Unset variables fall back to the builder defaults. Set but unparseable
    /// values are reported as configuration errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            builder = builder.database_path(path);
        }

        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            let max = raw.trim().parse::<u32>().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got '{}'", ENV_MAX_CONNECTIONS, raw))
            })?;
            builder = builder.max_connections(max);
        }

        if let Some(raw) = lookup(ENV_TRENDING_DAYS) {
            let days = raw.trim().parse::<i32>().map_err(|_| {
                Error::Config(format!("{} must be an integer, got '{}'", ENV_TRENDING_DAYS, raw))
            })?;
            builder = builder.default_trending_days(days);
        }

        let mut logging = LoggingConfig::default();
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            logging = logging.with_level(raw.parse::<LogLevel>()?);
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            logging = logging.with_format(raw.parse::<LogFormat>()?);
        }

        builder.logging(logging).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.max_connections > MAX_CONNECTIONS_LIMIT {
            return Err(Error::Config(format!(
                "max_connections must not exceed {}",
                MAX_CONNECTIONS_LIMIT
            )));
        }

        if !(1..=30).contains(&self.default_trending_days) {
            return Err(Error::Config(format!(
                "default_trending_days must be between 1 and 30, got {}",
                self.default_trending_days
            )));
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("database_path cannot be empty".to_string()));
            }
        }

        Ok(())
    }

    /// Whether the catalog lives in memory only
    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

/// Builder for [`CoreConfig`]
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    max_connections: Option<u32>,
    acquire_timeout: Option<Duration>,
    default_trending_days: Option<i32>,
    logging: Option<LoggingConfig>,
}

impl CoreConfigBuilder {
    /// Set the SQLite database file path
    ///
    /// Leaving it unset keeps the catalog in memory.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the maximum number of pooled connections
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Set the connection acquire timeout
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Set the trending window used by default
    pub fn default_trending_days(mut self, days: i32) -> Self {
        self.default_trending_days = Some(days);
        self
    }

    /// Set the logging configuration
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` with an actionable message when a value is out
    /// of range.
    pub fn build(self) -> Result<CoreConfig> {
        let config = CoreConfig {
            database_path: self.database_path,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: self.acquire_timeout.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT),
            default_trending_days: self.default_trending_days.unwrap_or(DEFAULT_TRENDING_DAYS),
            logging: self.logging.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
