//! # Catalog Repository
//!
//! Operations that span products and their children.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product_details(slug, product_id)   public landing page               │
//! │      products ─► ingredients ─► why_choose   (one connection)          │
//! │                                                                         │
//! │  dashboard_stats()                   admin dashboard                   │
//! │      counts ─► 5 newest products ─► 6 months of creation stats         │
//! │                                                                         │
//! │  create_product_with_content(..)     admin "new product" form          │
//! │      BEGIN                                                             │
//! │        INSERT product (public id retry)                                │
//! │        INSERT ingredients ...                                          │
//! │        INSERT why_choose ...                                           │
//! │      COMMIT   (any failure: ROLLBACK, nothing persists)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The single-entity repositories autocommit each call. Only
//! `create_product_with_content` groups writes into a transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::ingredient::{count_ingredients, fetch_for_product as ingredients_for, insert_ingredient};
use crate::repository::product::{
    count_products, fetch_by_slug_and_product_id, fetch_recent, insert_with_generated_id,
    month_window_start, stats_since,
};
use crate::repository::why_choose::{count_why_choose, fetch_for_product as why_choose_for, insert_why_choose};
use crate::repository::{timed, RepositoryOptions};
use landing_core::ids::generate_public_id;
use landing_core::validation::{validate_new_ingredient, validate_new_product, validate_new_why_choose};
use landing_core::{
    DashboardStats, EntityCounts, NewIngredient, NewProduct, NewWhyChoose, ProductDetails,
};

/// Number of products shown under "recent" on the dashboard.
pub const RECENT_PRODUCTS_LIMIT: u32 = 5;

/// Months covered by the dashboard's creation chart.
pub const DASHBOARD_MONTHS: u32 = 6;

/// Cross-table reads and the bundled product create.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    options: RepositoryOptions,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_options(pool, RepositoryOptions::default())
    }

    pub fn with_options(pool: SqlitePool, options: RepositoryOptions) -> Self {
        CatalogRepository { pool, options }
    }

    /// Everything the public page `/product/{slug}/{product_id}` shows.
    ///
    /// ## Returns
    /// * `Ok(Some(details))` - Product with its ingredients and why-choose items
    /// * `Ok(None)` - No product matches both `slug` and `product_id`
    pub async fn product_details(
        &self,
        slug: &str,
        product_id: &str,
    ) -> DbResult<Option<ProductDetails>> {
        timed(self.options.operation_timeout, "catalog.product_details", async {
            let mut conn = self.pool.acquire().await?;

            let Some(product) = fetch_by_slug_and_product_id(&mut conn, slug, product_id).await?
            else {
                return Ok(None);
            };

            let ingredients = ingredients_for(&mut conn, &product.id).await?;
            let why_choose = why_choose_for(&mut conn, &product.id).await?;

            Ok(Some(ProductDetails {
                product,
                ingredients,
                why_choose,
            }))
        })
        .await
    }

    /// Entity counts, the newest products and recent monthly stats.
    pub async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        timed(self.options.operation_timeout, "catalog.dashboard_stats", async {
            let mut conn = self.pool.acquire().await?;

            let counts = EntityCounts {
                products: count_products(&mut conn).await?,
                ingredients: count_ingredients(&mut conn).await?,
                why_choose: count_why_choose(&mut conn).await?,
            };
            let recent_products = fetch_recent(&mut conn, RECENT_PRODUCTS_LIMIT).await?;
            let cutoff = month_window_start(Utc::now(), DASHBOARD_MONTHS);
            let products_by_month = stats_since(&mut conn, &cutoff).await?;

            debug!(
                products = counts.products,
                ingredients = counts.ingredients,
                why_choose = counts.why_choose,
                "Dashboard stats collected"
            );

            Ok(DashboardStats {
                counts,
                recent_products,
                products_by_month,
            })
        })
        .await
    }

    /// Creates a product together with its ingredients and why-choose items
    /// in one transaction. Either everything is stored or nothing is.
    pub async fn create_product_with_content(
        &self,
        product: &NewProduct,
        ingredients: &[NewIngredient],
        why_choose: &[NewWhyChoose],
    ) -> DbResult<ProductDetails> {
        validate_new_product(product)?;
        for ingredient in ingredients {
            validate_new_ingredient(ingredient)?;
        }
        for item in why_choose {
            validate_new_why_choose(item)?;
        }

        let attempts = self.options.product_id_attempts;
        timed(self.options.operation_timeout, "catalog.create_product_with_content", async {
            let mut tx = self.pool.begin().await?;

            let product =
                insert_with_generated_id(&mut tx, product, attempts, generate_public_id).await?;

            let mut stored_ingredients = Vec::with_capacity(ingredients.len());
            for ingredient in ingredients {
                stored_ingredients.push(insert_ingredient(&mut tx, &product.id, ingredient).await?);
            }

            let mut stored_why_choose = Vec::with_capacity(why_choose.len());
            for item in why_choose {
                stored_why_choose.push(insert_why_choose(&mut tx, &product.id, item).await?);
            }

            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

            info!(
                id = %product.id,
                ingredients = stored_ingredients.len(),
                why_choose = stored_why_choose.len(),
                "Product created with content"
            );

            Ok(ProductDetails {
                product,
                ingredients: stored_ingredients,
                why_choose: stored_why_choose,
            })
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
