//! # landing-db: Database Layer for the Landing Catalog
//!
//! SQLite storage for products, ingredients and "why choose" items, using
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Landing Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (GET /product/{slug}/{product_id}, admin CRUD, ...)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    landing-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Product       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Ingredient    │    │ 001_initial_ │  │   │
//! │  │   │ DbConfig      │    │ WhyChoose     │    │   schema.sql │  │   │
//! │  │   │               │    │ Catalog       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (LANDING_DB_PATH)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool sizing, timeouts, environment loading
//! - [`pool`] - Connection pool creation
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use landing_db::{Database, DbConfig};
//! use landing_core::{NewProduct, ProductQuery};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let product = db
//!     .products()
//!     .create(&NewProduct::new("Keto Burn", "Daily fat burner", "https://shop.example/keto"))
//!     .await?;
//!
//! let page = db.products().find_all(&ProductQuery::new().search("burn")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::ingredient::IngredientRepository;
pub use repository::product::ProductRepository;
pub use repository::why_choose::WhyChooseRepository;
pub use repository::RepositoryOptions;
