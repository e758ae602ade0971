//! # Ingredient Repository
//!
//! Ingredients listed on a product's landing page. Every ingredient belongs
//! to exactly one product and disappears with it (`ON DELETE CASCADE`).

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{format_timestamp, now_timestamp, timed, RepositoryOptions};
use landing_core::ids::new_record_id;
use landing_core::validation::{validate_ingredient_changes, validate_new_ingredient};
use landing_core::{Ingredient, IngredientChanges, NewIngredient};

const INGREDIENT_COLUMNS: &str =
    "id, product_id, title, description, image_path, created_at, updated_at";

/// Repository for ingredient database operations.
#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
    options: RepositoryOptions,
}

impl IngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_options(pool, RepositoryOptions::default())
    }

    pub fn with_options(pool: SqlitePool, options: RepositoryOptions) -> Self {
        IngredientRepository { pool, options }
    }

    /// Adds an ingredient to the product with record id `product_id`.
    ///
    /// ## Returns
    /// * `Ok(Ingredient)` - The stored record
    /// * `Err(DbError::ForeignKeyViolation)` - No such product
    pub async fn create(&self, product_id: &str, ingredient: &NewIngredient) -> DbResult<Ingredient> {
        validate_new_ingredient(ingredient)?;

        timed(self.options.operation_timeout, "ingredients.create", async {
            let mut conn = self.pool.acquire().await?;
            insert_ingredient(&mut conn, product_id, ingredient).await
        })
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Ingredient>> {
        timed(self.options.operation_timeout, "ingredients.find_by_id", async {
            let mut conn = self.pool.acquire().await?;
            let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1");
            let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

            Ok(ingredient)
        })
        .await
    }

    /// All ingredients of a product in the order they were added.
    pub async fn find_by_product_id(&self, product_id: &str) -> DbResult<Vec<Ingredient>> {
        timed(self.options.operation_timeout, "ingredients.find_by_product_id", async {
            let mut conn = self.pool.acquire().await?;
            fetch_for_product(&mut conn, product_id).await
        })
        .await
    }

    /// Applies the supplied fields of `changes`. The owning product never
    /// changes.
    ///
    /// ## Returns
    /// * `Ok(Some(Ingredient))` - The updated record (unchanged if `changes` is empty)
    /// * `Ok(None)` - No ingredient with this id
    pub async fn update(&self, id: &str, changes: &IngredientChanges) -> DbResult<Option<Ingredient>> {
        validate_ingredient_changes(changes)?;

        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        debug!(id = %id, "Updating ingredient");

        timed(self.options.operation_timeout, "ingredients.update", async {
            let mut conn = self.pool.acquire().await?;

            let mut query = QueryBuilder::<Sqlite>::new("UPDATE ingredients SET updated_at = ");
            query.push_bind(format_timestamp(&now_timestamp()));
            if let Some(title) = &changes.title {
                query.push(", title = ").push_bind(title.clone());
            }
            if let Some(description) = &changes.description {
                query.push(", description = ").push_bind(description.clone());
            }
            if let Some(path) = &changes.image_path {
                query.push(", image_path = ").push_bind(path.clone());
            }
            query
                .push(" WHERE id = ")
                .push_bind(id.to_string())
                .push(" RETURNING ")
                .push(INGREDIENT_COLUMNS);

            let ingredient = query
                .build_query_as::<Ingredient>()
                .fetch_optional(&mut *conn)
                .await?;

            Ok(ingredient)
        })
        .await
    }

    /// Returns `true` when an ingredient was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting ingredient");

        timed(self.options.operation_timeout, "ingredients.delete", async {
            let mut conn = self.pool.acquire().await?;
            let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
                .bind(id)
                .execute(&mut *conn)
                .await?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    pub async fn count(&self) -> DbResult<i64> {
        timed(self.options.operation_timeout, "ingredients.count", async {
            let mut conn = self.pool.acquire().await?;
            count_ingredients(&mut conn).await
        })
        .await
    }
}

pub(crate) async fn insert_ingredient(
    conn: &mut SqliteConnection,
    product_id: &str,
    ingredient: &NewIngredient,
) -> DbResult<Ingredient> {
    let now = now_timestamp();
    let record = Ingredient {
        id: new_record_id(),
        product_id: product_id.to_string(),
        title: ingredient.title.clone(),
        description: ingredient.description.clone(),
        image_path: ingredient.image_path.clone(),
        created_at: now,
        updated_at: now,
    };

    debug!(product_id = %product_id, title = %record.title, "Inserting ingredient");

    sqlx::query(
        r#"
        INSERT INTO ingredients (
            id, product_id, title, description, image_path, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&record.id)
    .bind(&record.product_id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.image_path)
    .bind(format_timestamp(&record.created_at))
    .bind(format_timestamp(&record.updated_at))
    .execute(&mut *conn)
    .await?;

    Ok(record)
}

pub(crate) async fn fetch_for_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> DbResult<Vec<Ingredient>> {
    let sql = format!(
        "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE product_id = ?1 \
         ORDER BY created_at ASC, rowid ASC"
    );
    let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(ingredients)
}

pub(crate) async fn count_ingredients(conn: &mut SqliteConnection) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

// =============================================================================
// Unit Tests
// =============================================================================
