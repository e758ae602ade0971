//! # Database Pool Management
//!
//! Connection pool creation for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Server startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::from_env() / DbConfig::new(path)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Handlers share one Database (cheap to clone)                   │
//! │       ▼                                                                 │
//! │  Request 1 ──► db.products()   ──► Conn1 (released on return)          │
//! │  Request 2 ──► db.ingredients()──► Conn2                               │
//! │  Request N ──► waits up to acquire_timeout, then PoolExhausted         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no process-wide singleton: the embedding application builds one
//! `Database` and hands clones to whatever needs it.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::ingredient::IngredientRepository;
use crate::repository::product::ProductRepository;
use crate::repository::why_choose::WhyChooseRepository;
use crate::repository::RepositoryOptions;

/// Main database handle providing repository access.
///
/// ## Usage in a Handler
/// ```rust,ignore
/// async fn show_product(
///     db: &Database,
///     slug: &str,
///     product_id: &str,
/// ) -> Result<Option<ProductDetails>, DbError> {
///     db.catalog().product_details(slug, product_id).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,

    /// Timeout and retry settings handed to every repository.
    options: RepositoryOptions,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads (file databases)
    ///    - NORMAL synchronous
    ///    - Foreign keys enabled (required for cascading deletes)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(Database)` - Ready-to-use database handle
    /// * `Err(DbError)` - Invalid config, connection or migration failed
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        config
            .validate()
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let in_memory = is_in_memory(&config);

        let base_options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true)
        };

        let connect_options = base_options
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off; cascades depend on them.
            .foreign_keys(true);

        debug!(in_memory, "Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout);

        // An in-memory database lives exactly as long as its connection.
        pool_options = if in_memory {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            options: RepositoryOptions::from(&config),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// - Applies all pending migrations in order
    /// - Idempotent: safe to run multiple times
    /// - Called by `new()` when `run_migrations` is set
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer repository methods; this is for diagnostics and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Settings every repository is created with.
    pub fn options(&self) -> RepositoryOptions {
        self.options
    }

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = db.products().find_all(&ProductQuery::new().search("burn")).await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::with_options(self.pool.clone(), self.options)
    }

    /// Returns the ingredient repository.
    pub fn ingredients(&self) -> IngredientRepository {
        IngredientRepository::with_options(self.pool.clone(), self.options)
    }

    /// Returns the "why choose" repository.
    pub fn why_choose(&self) -> WhyChooseRepository {
        WhyChooseRepository::with_options(self.pool.clone(), self.options)
    }

    /// Returns the cross-table catalog repository.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::with_options(self.pool.clone(), self.options)
    }

    /// Closes the database connection pool.
    ///
    /// Waits for checked-out connections to be returned. After this call,
    /// every repository operation fails with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

fn is_in_memory(config: &DbConfig) -> bool {
    config.database_path.as_os_str() == ":memory:"
}

// =============================================================================
// Unit Tests
// =============================================================================
