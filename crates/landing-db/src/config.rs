//! # Database Configuration
//!
//! Pool sizing, timeouts and the product-id retry budget.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Builder calls in code (tests, embedding applications)              │
//! │     DbConfig::new(path).max_connections(4)                             │
//! │                                                                         │
//! │  2. Environment Variables (DbConfig::from_env)                         │
//! │     LANDING_DB_PATH=./data/landing.db                                  │
//! │     LANDING_DB_MAX_CONNECTIONS=10                                      │
//! │     LANDING_DB_ACQUIRE_TIMEOUT_SECS=30                                 │
//! │     LANDING_DB_OPERATION_TIMEOUT_SECS=10                               │
//! │     LANDING_DB_PRODUCT_ID_ATTEMPTS=5                                   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default database file used when `LANDING_DB_PATH` is not set.
pub const DEFAULT_DATABASE_PATH: &str = "./landing.db";

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/landing.db")
///     .max_connections(5)
///     .operation_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 10. Further callers queue for a free connection.
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long a caller waits for a pooled connection before
    /// `DbError::PoolExhausted`.
    /// Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Time budget for one repository operation, including the wait for a
    /// connection. Expiry yields `DbError::Timeout`.
    /// Default: 10 seconds
    pub operation_timeout: Duration,

    /// How many public product ids `ProductRepository::create` tries before
    /// giving up with `DbError::IdentifierExhausted`.
    /// Default: 5
    pub product_id_attempts: u32,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            operation_timeout: Duration::from_secs(10),
            product_id_attempts: 5,
            run_migrations: true,
        }
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            operation_timeout: Duration::from_secs(10),
            product_id_attempts: 5,
            run_migrations: true,
        }
    }

    /// Loads configuration from `LANDING_DB_*` environment variables,
    /// falling back to the defaults of [`DbConfig::new`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var("LANDING_DB_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
        let defaults = DbConfig::new(path);

        let config = DbConfig {
            max_connections: env_or("LANDING_DB_MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout: Duration::from_secs(env_or(
                "LANDING_DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            operation_timeout: Duration::from_secs(env_or(
                "LANDING_DB_OPERATION_TIMEOUT_SECS",
                defaults.operation_timeout.as_secs(),
            )?),
            product_id_attempts: env_or(
                "LANDING_DB_PRODUCT_ID_ATTEMPTS",
                defaults.product_id_attempts,
            )?,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that the values can build a working pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidValue("min_connections".to_string()));
        }
        if self.product_id_attempts == 0 {
            return Err(ConfigError::InvalidValue("product_id_attempts".to_string()));
        }
        if self.operation_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("operation_timeout".to_string()));
        }
        Ok(())
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets how long to wait for a pooled connection.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the per-operation time budget.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Sets the public product id retry budget.
    pub fn product_id_attempts(mut self, attempts: u32) -> Self {
        self.product_id_attempts = attempts;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
