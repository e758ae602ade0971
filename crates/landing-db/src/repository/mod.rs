//! # Repository Module
//!
//! Database repository implementations for the landing catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().find_all(query)                                 │
//! │       ▼                                                                 │
//! │  ProductRepository / IngredientRepository / WhyChooseRepository        │
//! │  ├── create(&self, new)                                                │
//! │  ├── find_by_id(&self, id)                                             │
//! │  ├── update(&self, id, changes)                                        │
//! │  ├── delete(&self, id)                                                 │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       │  timed(operation_timeout, ...)                                 │
//! │       │  one pooled connection per call                                │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  CatalogRepository composes the three tables for the public page,      │
//! │  the dashboard and the transactional bundled create.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product CRUD, listing and monthly stats
//! - [`IngredientRepository`] - Ingredients of a product
//! - [`WhyChooseRepository`] - "Why choose" items of a product
//! - [`CatalogRepository`] - Cross-table reads and the bundled create
//!
//! [`ProductRepository`]: product::ProductRepository
//! [`IngredientRepository`]: ingredient::IngredientRepository
//! [`WhyChooseRepository`]: why_choose::WhyChooseRepository
//! [`CatalogRepository`]: catalog::CatalogRepository

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use tracing::warn;

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};

pub mod catalog;
pub mod ingredient;
pub mod product;
pub mod why_choose;

/// Per-call settings shared by every repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Time budget for a single repository operation.
    pub operation_timeout: Duration,

    /// Public product id attempts before `IdentifierExhausted`.
    pub product_id_attempts: u32,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        RepositoryOptions {
            operation_timeout: Duration::from_secs(10),
            product_id_attempts: 5,
        }
    }
}

impl From<&DbConfig> for RepositoryOptions {
    fn from(config: &DbConfig) -> Self {
        RepositoryOptions {
            operation_timeout: config.operation_timeout,
            product_id_attempts: config.product_id_attempts,
        }
    }
}

/// Runs `fut` under `limit`, mapping expiry to [`DbError::Timeout`].
///
/// Dropping the timed-out future releases any connection it held.
pub(crate) async fn timed<T, F>(limit: Duration, operation: &'static str, fut: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Database operation timed out");
            Err(DbError::timeout(operation))
        }
    }
}

/// Current time at the precision stored in the database (microseconds).
pub(crate) fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 text (`2026-10-19T08:30:00.000000Z`), so text order
/// matches time order.
pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Builds a `LIKE` pattern matching `term` anywhere, with `%`, `_` and the
/// escape character itself matched literally. Use with `ESCAPE '\'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================
