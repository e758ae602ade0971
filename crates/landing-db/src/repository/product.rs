//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with slug derivation and public id allocation
//! - Paginated listing with search and sort
//! - Monthly creation statistics for the dashboard
//!
//! ## Public Id Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create(new_product)                                  │
//! │                                                                         │
//! │  attempt 1..=product_id_attempts                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  candidate = random 100..=999                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO products (... product_id = candidate ...)                 │
//! │       │                                                                 │
//! │       ├── ok                                  → return Product         │
//! │       ├── UNIQUE products.product_id          → next attempt           │
//! │       └── any other error (slug taken, ...)   → return error           │
//! │                                                                         │
//! │  attempts used up → DbError::IdentifierExhausted                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The UNIQUE constraint is the only arbiter: two concurrent creates that
//! draw the same candidate cannot both succeed.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{
    contains_pattern, format_timestamp, now_timestamp, timed, RepositoryOptions,
};
use landing_core::ids::{generate_public_id, new_record_id};
use landing_core::validation::{validate_new_product, validate_product_changes, validate_search_query};
use landing_core::{MonthlyCount, NewProduct, Product, ProductChanges, ProductPage, ProductQuery, ProductSort};

/// Column list matching [`Product`]'s `FromRow` fields.
pub(crate) const PRODUCT_COLUMNS: &str = "id, name, slug, description, redirect_link, \
     image_path, badge_path, money_back_days, product_id, created_at, updated_at";

/// Column that holds the public id, as SQLite names it in constraint errors.
const PUBLIC_ID_COLUMN: &str = "products.product_id";

const SLUG_COLUMN: &str = "products.slug";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.create(&NewProduct::new("Keto Burn", "Fat burner", link)).await?;
/// let same = repo.find_by_slug_and_product_id(&product.slug, &product.product_id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    options: RepositoryOptions,
}

impl ProductRepository {
    /// Creates a new ProductRepository with default options.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_options(pool, RepositoryOptions::default())
    }

    /// Creates a new ProductRepository with explicit options.
    pub fn with_options(pool: SqlitePool, options: RepositoryOptions) -> Self {
        ProductRepository { pool, options }
    }

    /// Inserts a product with a fresh UUID, a slug (explicit or derived
    /// from the name) and a randomly allocated public id.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored record
    /// * `Err(DbError::Validation)` - Input rejected
    /// * `Err(DbError::UniqueViolation)` - Slug already taken
    /// * `Err(DbError::IdentifierExhausted)` - Every public id candidate collided
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        self.create_using(product, generate_public_id).await
    }

    /// [`create`](Self::create) with a caller-supplied public id source.
    pub(crate) async fn create_using<F>(&self, product: &NewProduct, next_id: F) -> DbResult<Product>
    where
        F: FnMut() -> String,
    {
        validate_new_product(product)?;

        let attempts = self.options.product_id_attempts;
        timed(self.options.operation_timeout, "products.create", async {
            let mut conn = self.pool.acquire().await?;
            insert_with_generated_id(&mut conn, product, attempts, next_id).await
        })
        .await
    }

    /// Inserts a product with a caller-chosen public id, in a single attempt.
    ///
    /// A taken id surfaces as `DbError::UniqueViolation` on
    /// `products.product_id`.
    pub async fn create_with_product_id(
        &self,
        product: &NewProduct,
        product_id: &str,
    ) -> DbResult<Product> {
        validate_new_product(product)?;
        landing_core::validation::validate_public_id(product_id)?;

        timed(self.options.operation_timeout, "products.create", async {
            let mut conn = self.pool.acquire().await?;
            insert_product(&mut conn, product, product_id).await
        })
        .await
    }

    /// Gets a product by its record id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        timed(self.options.operation_timeout, "products.find_by_id", async {
            let mut conn = self.pool.acquire().await?;
            fetch_by_id(&mut conn, id).await
        })
        .await
    }

    /// Resolves the public `/product/{slug}/{product_id}` pair.
    pub async fn find_by_slug_and_product_id(
        &self,
        slug: &str,
        product_id: &str,
    ) -> DbResult<Option<Product>> {
        timed(
            self.options.operation_timeout,
            "products.find_by_slug_and_product_id",
            async {
                let mut conn = self.pool.acquire().await?;
                fetch_by_slug_and_product_id(&mut conn, slug, product_id).await
            },
        )
        .await
    }

    /// Lists products with optional search, sort and pagination.
    ///
    /// ## How It Works
    /// - `search` matches a case-insensitive substring of `name` or
    ///   `description`; `%` and `_` in the term match literally
    /// - `page`/`limit` are clamped (see [`ProductQuery::normalized`])
    /// - `total` counts every match, ignoring pagination
    ///
    /// ## Example
    /// ```rust,ignore
    /// let page = repo.find_all(&ProductQuery::new().search("burn").paginate(2, 5)).await?;
    /// assert!(page.products.len() <= 5);
    /// ```
    pub async fn find_all(&self, query: &ProductQuery) -> DbResult<ProductPage> {
        let query = query.clone().normalized();
        let search = match query.search.as_deref() {
            Some(term) => validate_search_query(term)?,
            None => None,
        };
        let pattern = search
            .as_deref()
            .map(|term| contains_pattern(&term.to_lowercase()));

        debug!(
            search = ?search,
            sort = %query.sort,
            page = query.page,
            limit = query.limit,
            "Listing products"
        );

        timed(self.options.operation_timeout, "products.find_all", async {
            let mut conn = self.pool.acquire().await?;

            let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products");
            push_search_filter(&mut count_query, pattern.as_deref());
            let total: i64 = count_query
                .build_query_scalar::<i64>()
                .fetch_one(&mut *conn)
                .await?;

            let mut list_query = QueryBuilder::<Sqlite>::new("SELECT ");
            list_query.push(PRODUCT_COLUMNS).push(" FROM products");
            push_search_filter(&mut list_query, pattern.as_deref());
            list_query
                .push(" ORDER BY ")
                .push(order_clause(query.sort))
                .push(" LIMIT ")
                .push_bind(i64::from(query.limit))
                .push(" OFFSET ")
                .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

            let products = list_query
                .build_query_as::<Product>()
                .fetch_all(&mut *conn)
                .await?;

            debug!(count = products.len(), total, "Listing returned products");

            Ok(ProductPage {
                products,
                total,
                page: query.page,
                limit: query.limit,
            })
        })
        .await
    }

    /// Applies the supplied fields of `changes`.
    ///
    /// A new `name` also rewrites `slug`; `product_id` never changes.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - The updated record (unchanged if `changes` is empty)
    /// * `Ok(None)` - No product with this id
    pub async fn update(&self, id: &str, changes: &ProductChanges) -> DbResult<Option<Product>> {
        validate_product_changes(changes)?;

        debug!(id = %id, "Updating product");

        timed(self.options.operation_timeout, "products.update", async {
            let mut conn = self.pool.acquire().await?;

            if changes.is_empty() {
                return fetch_by_id(&mut conn, id).await;
            }

            let mut query = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
            query.push_bind(format_timestamp(&now_timestamp()));

            if let Some(name) = &changes.name {
                query.push(", name = ").push_bind(name.clone());
                query.push(", name_folded = ").push_bind(name.to_lowercase());
            }
            let slug = changes.derived_slug();
            if let Some(slug) = &slug {
                query.push(", slug = ").push_bind(slug.clone());
            }
            if let Some(description) = &changes.description {
                query.push(", description = ").push_bind(description.clone());
                query
                    .push(", description_folded = ")
                    .push_bind(description.to_lowercase());
            }
            if let Some(link) = &changes.redirect_link {
                query.push(", redirect_link = ").push_bind(link.clone());
            }
            if let Some(path) = &changes.image_path {
                query.push(", image_path = ").push_bind(path.clone());
            }
            if let Some(path) = &changes.badge_path {
                query.push(", badge_path = ").push_bind(path.clone());
            }
            if let Some(days) = changes.money_back_days {
                query.push(", money_back_days = ").push_bind(days);
            }

            query
                .push(" WHERE id = ")
                .push_bind(id.to_string())
                .push(" RETURNING ")
                .push(PRODUCT_COLUMNS);

            let product = query
                .build_query_as::<Product>()
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| match DbError::from(e) {
                    DbError::UniqueViolation { field, .. } if field == SLUG_COLUMN => {
                        DbError::duplicate(field, slug.clone().unwrap_or_default())
                    }
                    other => other,
                })?;

            Ok(product)
        })
        .await
    }

    /// Deletes a product and, through the cascade, its ingredients and
    /// why-choose items.
    ///
    /// ## Returns
    /// * `Ok(true)` - A product was removed
    /// * `Ok(false)` - No product with this id
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting product");

        timed(self.options.operation_timeout, "products.delete", async {
            let mut conn = self.pool.acquire().await?;
            let result = sqlx::query("DELETE FROM products WHERE id = ?1")
                .bind(id)
                .execute(&mut *conn)
                .await?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        timed(self.options.operation_timeout, "products.count", async {
            let mut conn = self.pool.acquire().await?;
            count_products(&mut conn).await
        })
        .await
    }

    /// Product counts per calendar month, for the current month and the
    /// `months - 1` months before it, oldest first. Months without products
    /// are omitted.
    pub async fn get_stats_by_month(&self, months: u32) -> DbResult<Vec<MonthlyCount>> {
        self.stats_by_month_at(months, Utc::now()).await
    }

    /// [`get_stats_by_month`](Self::get_stats_by_month) relative to `now`.
    pub async fn stats_by_month_at(
        &self,
        months: u32,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlyCount>> {
        if months == 0 {
            return Ok(Vec::new());
        }

        timed(self.options.operation_timeout, "products.stats_by_month", async {
            let mut conn = self.pool.acquire().await?;
            stats_since(&mut conn, &month_window_start(now, months)).await
        })
        .await
    }
}

// =============================================================================
// Connection-level helpers (shared with CatalogRepository)
// =============================================================================

/// Inserts one product row with the given public id.
pub(crate) async fn insert_product(
    conn: &mut SqliteConnection,
    product: &NewProduct,
    product_id: &str,
) -> DbResult<Product> {
    let now = now_timestamp();
    let record = Product {
        id: new_record_id(),
        name: product.name.clone(),
        slug: product.resolved_slug(),
        description: product.description.clone(),
        redirect_link: product.redirect_link.clone(),
        image_path: product.image_path.clone(),
        badge_path: product.badge_path.clone(),
        money_back_days: product.resolved_money_back_days(),
        product_id: product_id.to_string(),
        created_at: now,
        updated_at: now,
    };

    debug!(slug = %record.slug, product_id = %record.product_id, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, slug, description, redirect_link,
            image_path, badge_path, money_back_days, product_id,
            created_at, updated_at, name_folded, description_folded
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(&record.slug)
    .bind(&record.description)
    .bind(&record.redirect_link)
    .bind(&record.image_path)
    .bind(&record.badge_path)
    .bind(record.money_back_days)
    .bind(&record.product_id)
    .bind(format_timestamp(&record.created_at))
    .bind(format_timestamp(&record.updated_at))
    .bind(record.name.to_lowercase())
    .bind(record.description.to_lowercase())
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } if field == SLUG_COLUMN => {
            DbError::duplicate(field, record.slug.clone())
        }
        DbError::UniqueViolation { field, .. } if field == PUBLIC_ID_COLUMN => {
            DbError::duplicate(field, record.product_id.clone())
        }
        other => other,
    })?;

    Ok(record)
}

/// Inserts a product, drawing public ids from `next_id` until one is free
/// or `attempts` are used up.
pub(crate) async fn insert_with_generated_id<F>(
    conn: &mut SqliteConnection,
    product: &NewProduct,
    attempts: u32,
    mut next_id: F,
) -> DbResult<Product>
where
    F: FnMut() -> String,
{
    for attempt in 1..=attempts {
        let candidate = next_id();
        match insert_product(conn, product, &candidate).await {
            Ok(record) => return Ok(record),
            Err(e) if e.is_unique_violation_on(PUBLIC_ID_COLUMN) => {
                warn!(attempt, product_id = %candidate, "Public product id collision, regenerating");
            }
            Err(e) => return Err(e),
        }
    }

    Err(DbError::IdentifierExhausted { attempts })
}

pub(crate) async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

pub(crate) async fn fetch_by_slug_and_product_id(
    conn: &mut SqliteConnection,
    slug: &str,
    product_id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = ?1 AND product_id = ?2");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(slug)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

/// The `limit` most recently created products, newest first.
pub(crate) async fn fetch_recent(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<Product>> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY {} LIMIT ?1",
        order_clause(ProductSort::Newest)
    );
    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(i64::from(limit))
        .fetch_all(&mut *conn)
        .await?;

    Ok(products)
}

pub(crate) async fn count_products(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Per-month counts of products created at or after `cutoff`
/// (`YYYY-MM-DD HH:MM:SS`, UTC).
pub(crate) async fn stats_since(
    conn: &mut SqliteConnection,
    cutoff: &str,
) -> DbResult<Vec<MonthlyCount>> {
    let stats = sqlx::query_as::<_, MonthlyCount>(
        r#"
        SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS count
        FROM products
        WHERE datetime(created_at) >= ?1
        GROUP BY month
        ORDER BY month ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(&mut *conn)
    .await?;

    Ok(stats)
}

/// Start of the statistics window: midnight on the first day of the month
/// `months - 1` months before `now`'s month.
pub(crate) fn month_window_start(now: DateTime<Utc>, months: u32) -> String {
    let index = i64::from(now.year()) * 12 + i64::from(now.month0())
        - i64::from(months.saturating_sub(1));

    i32::try_from(index.div_euclid(12))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, index.rem_euclid(12) as u32 + 1, 1))
        .map(|start| start.format("%Y-%m-%d 00:00:00").to_string())
        // Windows reaching past the calendar's range cover everything.
        .unwrap_or_else(|| "0000-01-01 00:00:00".to_string())
}

fn order_clause(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => "created_at DESC, rowid DESC",
        ProductSort::Oldest => "created_at ASC, rowid ASC",
        ProductSort::NameAsc => "name ASC, rowid ASC",
        ProductSort::NameDesc => "name DESC, rowid DESC",
        ProductSort::Insertion => "rowid ASC",
    }
}

fn push_search_filter(query: &mut QueryBuilder<'_, Sqlite>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        query
            .push(" WHERE (name_folded LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\' OR description_folded LIKE ")
            .push_bind(pattern.to_string())
            .push(" ESCAPE '\\')");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use landing_core::{NewIngredient, NewWhyChoose};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn keto() -> NewProduct {
        NewProduct::new("Keto Burn", "Daily fat burner", "https://shop.example/keto")
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        let db = test_db().await;
        let repo = db.products();

        let input = keto().image_path("uploads/keto.webp").money_back_days(90);
        let created = repo.create(&input).await.unwrap();

        assert_eq!(created.id.len(), 36);
        assert_eq!(created.name, "Keto Burn");
        assert_eq!(created.slug, "keto-burn");
        assert_eq!(created.description, "Daily fat burner");
        assert_eq!(created.redirect_link, "https://shop.example/keto");
        assert_eq!(created.image_path.as_deref(), Some("uploads/keto.webp"));
        assert_eq!(created.badge_path, None);
        assert_eq!(created.money_back_days, 90);
        assert!(landing_core::validation::validate_public_id(&created.product_id).is_ok());

        let found = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_create_defaults_and_explicit_slug() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .create(&NewProduct::new("Green Tea & Citrus!!", "Tea", "https://x.test"))
            .await
            .unwrap();
        assert_eq!(created.slug, "green-tea-and-citrus");
        assert_eq!(created.money_back_days, landing_core::DEFAULT_MONEY_BACK_DAYS);

        let custom = repo
            .create(&NewProduct::new("Night Burn", "Sleep aid", "https://x.test").slug("pm-burn"))
            .await
            .unwrap();
        assert_eq!(custom.slug, "pm-burn");
        assert_eq!(custom.public_path(), format!("/product/pm-burn/{}", custom.product_id));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo
            .create(&NewProduct::new("  ", "desc", "https://x.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = repo
            .create(&NewProduct::new("!!!", "desc", "https://x.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_constraint_violation() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&keto()).await.unwrap();
        let err = repo.create(&keto()).await.unwrap_err();

        assert!(err.is_constraint_violation());
        assert!(err.is_unique_violation_on("products.slug"));
        assert!(matches!(&err, DbError::UniqueViolation { value, .. } if value == "keto-burn"));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_slug_and_product_id() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&keto()).await.unwrap();

        let found = repo
            .find_by_slug_and_product_id("keto-burn", &created.product_id)
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.id), Some(created.id.clone()));

        let other_id = if created.product_id == "100" { "101" } else { "100" };
        assert!(repo
            .find_by_slug_and_product_id("keto-burn", other_id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_slug_and_product_id("other", &created.product_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let db = test_db().await;
        assert!(db.products().find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_name_rewrites_slug_keeps_public_id() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&keto()).await.unwrap();
        let updated = repo
            .update(&created.id, &ProductChanges::new().name("New Name"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.slug, "new-name");
        assert_eq!(updated.product_id, created.product_id);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&keto().badge_path("badges/a.png")).await.unwrap();
        let updated = repo
            .update(
                &created.id,
                &ProductChanges::new().money_back_days(30).image_path("uploads/new.webp"),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.money_back_days, 30);
        assert_eq!(updated.image_path.as_deref(), Some("uploads/new.webp"));
        assert_eq!(updated.badge_path.as_deref(), Some("badges/a.png"));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.slug, created.slug);
    }

    #[tokio::test]
    async fn test_update_empty_and_missing() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo.create(&keto()).await.unwrap();
        let unchanged = repo.update(&created.id, &ProductChanges::new()).await.unwrap();
        assert_eq!(unchanged, Some(created));

        let missing = repo
            .update("missing", &ProductChanges::new().name("X"))
            .await
            .unwrap();
        assert!(missing.is_none());

        let err = repo
            .update("missing", &ProductChanges::new().money_back_days(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_rename_onto_taken_slug() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&keto()).await.unwrap();
        let other = repo
            .create(&NewProduct::new("Other", "desc", "https://x.test"))
            .await
            .unwrap();

        let err = repo
            .update(&other.id, &ProductChanges::new().name("Keto Burn"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("products.slug"));
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref value, .. } if value == "keto-burn"
        ));
    }

    #[tokio::test]
    async fn test_padded_text_stored_as_supplied() {
        let db = test_db().await;
        let repo = db.products();

        let input = NewProduct::new("  Keto Burn  ", "Daily fat burner", " https://x.test ");
        let created = repo.create(&input).await.unwrap();
        assert_eq!(created.name, "  Keto Burn  ");
        assert_eq!(created.redirect_link, " https://x.test ");
        assert_eq!(created.slug, "keto-burn");
        assert_eq!(repo.find_by_id(&created.id).await.unwrap().unwrap(), created);

        let updated = repo
            .update(
                &created.id,
                &ProductChanges::new()
                    .name("  Keto Max  ")
                    .redirect_link(" https://y.test "),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "  Keto Max  ");
        assert_eq!(updated.redirect_link, " https://y.test ");
        assert_eq!(updated.slug, "keto-max");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let db = test_db().await;
        let products = db.products();
        let ingredients = db.ingredients();
        let why_choose = db.why_choose();

        let product = products.create(&keto()).await.unwrap();
        ingredients
            .create(&product.id, &NewIngredient::new("Green Tea", "Antioxidants"))
            .await
            .unwrap();
        ingredients
            .create(&product.id, &NewIngredient::new("Caffeine", "Energy"))
            .await
            .unwrap();
        why_choose
            .create(&product.id, &NewWhyChoose::new("Natural", "No fillers"))
            .await
            .unwrap();

        assert!(products.delete(&product.id).await.unwrap());

        assert!(ingredients.find_by_product_id(&product.id).await.unwrap().is_empty());
        assert!(why_choose.find_by_product_id(&product.id).await.unwrap().is_empty());
        assert_eq!(ingredients.count().await.unwrap(), 0);
        assert_eq!(why_choose.count().await.unwrap(), 0);

        assert!(!products.delete(&product.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_tracks_creates() {
        let db = test_db().await;
        let repo = db.products();

        assert_eq!(repo.count().await.unwrap(), 0);
        for i in 0..4 {
            repo.create(&NewProduct::new(format!("Product {i}"), "desc", "https://x.test"))
                .await
                .unwrap();
        }
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_find_all_search_and_pagination() {
        let db = test_db().await;
        let repo = db.products();

        for i in 0..7 {
            let (name, description) = if i % 2 == 0 {
                (format!("Fat BURN {i}"), "Thermogenic".to_string())
            } else {
                (format!("Formula {i}"), "Helps you burn calories".to_string())
            };
            repo.create(&NewProduct::new(name, description, "https://x.test"))
                .await
                .unwrap();
        }
        for i in 0..5 {
            repo.create(&NewProduct::new(format!("Sleep {i}"), "Rest", "https://x.test"))
                .await
                .unwrap();
        }

        let page = repo
            .find_all(&ProductQuery::new().search("burn").paginate(2, 5))
            .await
            .unwrap();

        assert_eq!(page.total, 7);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 5);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.products.len(), 2);
        for product in &page.products {
            let haystack = format!("{} {}", product.name, product.description).to_lowercase();
            assert!(haystack.contains("burn"));
        }

        let all = repo.find_all(&ProductQuery::new().paginate(1, 100)).await.unwrap();
        assert_eq!(all.total, 12);
        assert_eq!(all.products.len(), 12);

        let beyond = repo
            .find_all(&ProductQuery::new().search("burn").paginate(9, 5))
            .await
            .unwrap();
        assert!(beyond.products.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[tokio::test]
    async fn test_find_all_matches_wildcards_literally() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&NewProduct::new("Pure 100% Whey", "Protein", "https://x.test"))
            .await
            .unwrap();
        repo.create(&NewProduct::new("Pure 1000 Whey", "Protein", "https://x.test"))
            .await
            .unwrap();
        repo.create(&NewProduct::new("Whey Isolate", "low_fat blend", "https://x.test"))
            .await
            .unwrap();

        let page = repo.find_all(&ProductQuery::new().search("100%")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.products[0].name, "Pure 100% Whey");

        let page = repo.find_all(&ProductQuery::new().search("1_0")).await.unwrap();
        assert_eq!(page.total, 0);

        let page = repo.find_all(&ProductQuery::new().search("low_fat")).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_find_all_folds_non_ascii_case() {
        let db = test_db().await;
        let repo = db.products();

        let created = repo
            .create(&NewProduct::new("Açaí Berry", "Énergie naturelle", "https://x.test"))
            .await
            .unwrap();
        repo.create(&keto()).await.unwrap();

        for term in ["açaí", "AÇAÍ", "Açaí", "énergie", "ÉNERGIE"] {
            let page = repo.find_all(&ProductQuery::new().search(term)).await.unwrap();
            assert_eq!(page.total, 1, "search {term:?}");
            assert_eq!(page.products[0].id, created.id);
        }

        repo.update(&created.id, &ProductChanges::new().name("Ñandú Blend").description("Mezcla"))
            .await
            .unwrap();
        let page = repo.find_all(&ProductQuery::new().search("ÑANDÚ")).await.unwrap();
        assert_eq!(page.total, 1);
        let page = repo.find_all(&ProductQuery::new().search("énergie")).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_find_all_sort_orders() {
        let db = test_db().await;
        let repo = db.products();

        for name in ["Bravo", "Alpha", "Charlie"] {
            repo.create(&NewProduct::new(name, "desc", "https://x.test"))
                .await
                .unwrap();
        }

        let names = |page: ProductPage| page.products.into_iter().map(|p| p.name).collect::<Vec<_>>();

        let sorted = repo
            .find_all(&ProductQuery::new().sort(ProductSort::NameAsc))
            .await
            .unwrap();
        assert_eq!(names(sorted), ["Alpha", "Bravo", "Charlie"]);

        let sorted = repo
            .find_all(&ProductQuery::new().sort(ProductSort::NameDesc))
            .await
            .unwrap();
        assert_eq!(names(sorted), ["Charlie", "Bravo", "Alpha"]);

        let sorted = repo
            .find_all(&ProductQuery::new().sort(ProductSort::Newest))
            .await
            .unwrap();
        assert_eq!(names(sorted), ["Charlie", "Alpha", "Bravo"]);

        let sorted = repo
            .find_all(&ProductQuery::new().sort(ProductSort::Oldest))
            .await
            .unwrap();
        assert_eq!(names(sorted), ["Bravo", "Alpha", "Charlie"]);

        let sorted = repo
            .find_all(&ProductQuery::new().sort(ProductSort::parse_lenient("price")))
            .await
            .unwrap();
        assert_eq!(names(sorted), ["Bravo", "Alpha", "Charlie"]);
    }

    #[tokio::test]
    async fn test_find_all_rejects_oversized_search() {
        let db = test_db().await;
        let err = db
            .products()
            .find_all(&ProductQuery::new().search("x".repeat(500)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_public_id() {
        // Two connections onto one shared in-memory database.
        let db = Database::new(DbConfig::in_memory().max_connections(2))
            .await
            .unwrap();
        let first = db.products();
        let second = db.products();

        let a = NewProduct::new("Alpha", "desc", "https://x.test");
        let b = NewProduct::new("Bravo", "desc", "https://x.test");
        let (ra, rb) = tokio::join!(
            first.create_with_product_id(&a, "555"),
            second.create_with_product_id(&b, "555"),
        );

        let results = [ra, rb];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert!(err.is_constraint_violation());
        assert!(err.is_unique_violation_on("products.product_id"));
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_regenerates_colliding_public_id() {
        let db = test_db().await;
        let repo = db.products();

        repo.create_with_product_id(&keto(), "500").await.unwrap();

        let mut candidates = vec!["501", "500", "500"];
        let product = repo
            .create_using(&NewProduct::new("Second", "desc", "https://x.test"), || {
                candidates.pop().unwrap_or("999").to_string()
            })
            .await
            .unwrap();

        assert_eq!(product.product_id, "501");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_attempts() {
        let config = DbConfig::in_memory().product_id_attempts(3);
        let db = Database::new(config).await.unwrap();
        let repo = db.products();

        repo.create_with_product_id(&keto(), "500").await.unwrap();

        let mut draws = 0;
        let err = repo
            .create_using(&NewProduct::new("Second", "desc", "https://x.test"), || {
                draws += 1;
                "500".to_string()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::IdentifierExhausted { attempts: 3 }));
        assert_eq!(draws, 3);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_slug_collision_is_not_retried() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&keto()).await.unwrap();

        let mut draws = 0;
        let err = repo
            .create_using(&keto(), || {
                draws += 1;
                "777".to_string()
            })
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on("products.slug"));
        assert_eq!(draws, 1);
    }

    #[tokio::test]
    async fn test_stats_current_month_only() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(&keto()).await.unwrap();
        repo.create(&NewProduct::new("Second", "desc", "https://x.test"))
            .await
            .unwrap();

        let now = Utc::now();
        let stats = repo.stats_by_month_at(1, now).await.unwrap();
        assert_eq!(
            stats,
            vec![MonthlyCount {
                month: now.format("%Y-%m").to_string(),
                count: 2,
            }]
        );

        assert!(repo.get_stats_by_month(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_bucket_by_calendar_month() {
        let db = test_db().await;
        let repo = db.products();

        let old = repo.create(&keto()).await.unwrap();
        let older = repo
            .create(&NewProduct::new("Older", "desc", "https://x.test"))
            .await
            .unwrap();
        repo.create(&NewProduct::new("Fresh", "desc", "https://x.test"))
            .await
            .unwrap();

        for (id, at) in [
            (&old.id, "2026-08-31T23:59:59.000000Z"),
            (&older.id, "2026-03-10T08:00:00.000000Z"),
        ] {
            sqlx::query("UPDATE products SET created_at = ?1 WHERE id = ?2")
                .bind(at)
                .bind(id)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        let stats = repo.stats_by_month_at(6, now).await.unwrap();
        let months: Vec<_> = stats.iter().map(|s| s.month.as_str()).collect();

        // The fresh product was created "now" in real time; only the two
        // backdated rows are guaranteed positions relative to the fixed clock.
        assert!(months.contains(&"2026-08"));
        assert!(!months.contains(&"2026-03"));
        assert!(months.windows(2).all(|w| w[0] < w[1]));

        let wide = repo.stats_by_month_at(12, now).await.unwrap();
        assert!(wide.iter().any(|s| s.month == "2026-03" && s.count == 1));
    }

    #[test]
    fn test_month_window_start() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(month_window_start(at, 1), "2026-03-01 00:00:00");
        assert_eq!(month_window_start(at, 3), "2026-01-01 00:00:00");
        assert_eq!(month_window_start(at, 6), "2025-10-01 00:00:00");
        assert_eq!(month_window_start(at, 15), "2025-01-01 00:00:00");
    }

    #[test]
    fn test_order_clause_breaks_ties() {
        assert!(order_clause(ProductSort::Newest).ends_with("rowid DESC"));
        assert_eq!(order_clause(ProductSort::Insertion), "rowid ASC");
    }
}
