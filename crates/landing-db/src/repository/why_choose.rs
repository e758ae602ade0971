//! # Why Choose Repository
//!
//! The "why choose this product" selling points. Same lifecycle as
//! ingredients, without an image.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{format_timestamp, now_timestamp, timed, RepositoryOptions};
use landing_core::ids::new_record_id;
use landing_core::validation::{validate_new_why_choose, validate_why_choose_changes};
use landing_core::{NewWhyChoose, WhyChoose, WhyChooseChanges};

const WHY_CHOOSE_COLUMNS: &str = "id, product_id, title, description, created_at, updated_at";

/// Repository for "why choose" items.
#[derive(Debug, Clone)]
pub struct WhyChooseRepository {
    pool: SqlitePool,
    options: RepositoryOptions,
}

impl WhyChooseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_options(pool, RepositoryOptions::default())
    }

    pub fn with_options(pool: SqlitePool, options: RepositoryOptions) -> Self {
        WhyChooseRepository { pool, options }
    }

    /// Adds an item to the product with record id `product_id`.
    pub async fn create(&self, product_id: &str, item: &NewWhyChoose) -> DbResult<WhyChoose> {
        validate_new_why_choose(item)?;

        timed(self.options.operation_timeout, "why_choose.create", async {
            let mut conn = self.pool.acquire().await?;
            insert_why_choose(&mut conn, product_id, item).await
        })
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<WhyChoose>> {
        timed(self.options.operation_timeout, "why_choose.find_by_id", async {
            let mut conn = self.pool.acquire().await?;
            let sql = format!("SELECT {WHY_CHOOSE_COLUMNS} FROM why_choose WHERE id = ?1");
            let item = sqlx::query_as::<_, WhyChoose>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

            Ok(item)
        })
        .await
    }

    /// All items of a product in the order they were added.
    pub async fn find_by_product_id(&self, product_id: &str) -> DbResult<Vec<WhyChoose>> {
        timed(self.options.operation_timeout, "why_choose.find_by_product_id", async {
            let mut conn = self.pool.acquire().await?;
            fetch_for_product(&mut conn, product_id).await
        })
        .await
    }

    pub async fn update(&self, id: &str, changes: &WhyChooseChanges) -> DbResult<Option<WhyChoose>> {
        validate_why_choose_changes(changes)?;

        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        debug!(id = %id, "Updating why-choose item");

        timed(self.options.operation_timeout, "why_choose.update", async {
            let mut conn = self.pool.acquire().await?;

            let mut query = QueryBuilder::<Sqlite>::new("UPDATE why_choose SET updated_at = ");
            query.push_bind(format_timestamp(&now_timestamp()));
            if let Some(title) = &changes.title {
                query.push(", title = ").push_bind(title.clone());
            }
            if let Some(description) = &changes.description {
                query.push(", description = ").push_bind(description.clone());
            }
            query
                .push(" WHERE id = ")
                .push_bind(id.to_string())
                .push(" RETURNING ")
                .push(WHY_CHOOSE_COLUMNS);

            let item = query
                .build_query_as::<WhyChoose>()
                .fetch_optional(&mut *conn)
                .await?;

            Ok(item)
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        timed(self.options.operation_timeout, "why_choose.delete", async {
            let mut conn = self.pool.acquire().await?;
            let result = sqlx::query("DELETE FROM why_choose WHERE id = ?1")
                .bind(id)
                .execute(&mut *conn)
                .await?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    pub async fn count(&self) -> DbResult<i64> {
        timed(self.options.operation_timeout, "why_choose.count", async {
            let mut conn = self.pool.acquire().await?;
            count_why_choose(&mut conn).await
        })
        .await
    }
}

pub(crate) async fn insert_why_choose(
    conn: &mut SqliteConnection,
    product_id: &str,
    item: &NewWhyChoose,
) -> DbResult<WhyChoose> {
    let now = now_timestamp();
    let record = WhyChoose {
        id: new_record_id(),
        product_id: product_id.to_string(),
        title: item.title.clone(),
        description: item.description.clone(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO why_choose (id, product_id, title, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&record.id)
    .bind(&record.product_id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(format_timestamp(&record.created_at))
    .bind(format_timestamp(&record.updated_at))
    .execute(&mut *conn)
    .await?;

    Ok(record)
}

pub(crate) async fn fetch_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<WhyChoose>> {
    let sql = format!(
        "SELECT {WHY_CHOOSE_COLUMNS} FROM why_choose WHERE product_id = ?1 \
         ORDER BY created_at ASC, rowid ASC"
    );
    let items = sqlx::query_as::<_, WhyChoose>(&sql)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(items)
}

pub(crate) async fn count_why_choose(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM why_choose")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}
