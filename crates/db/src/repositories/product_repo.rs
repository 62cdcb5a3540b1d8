//! Repository for the `products` and `product_categories` tables.
//!
//! Product writes that touch the join table run in a single transaction so a
//! product never exists without its category set.

use sqlx::{PgPool, Postgres, Transaction};
use shopfront_core::types::DbId;

use crate::models::product::{
    CreateProduct, Product, ProductCategoryRow, ProductFilter, UpdateProduct,
};

/// Column list for `products` queries.
const COLUMNS: &str = "id, name, price, description, user_id, created_at, updated_at";

/// Column list qualified with the `p` alias, for queries that join or filter.
const P_COLUMNS: &str =
    "p.id, p.name, p.price, p.description, p.user_id, p.created_at, p.updated_at";

/// Provides CRUD operations, category membership, and filtered lookups for products.
pub struct ProductRepo;

impl ProductRepo {
    // -----------------------------------------------------------------------
    // Product CRUD
    // -----------------------------------------------------------------------

    /// Insert a product and its category memberships in one transaction.
    ///
    /// `category_ids` must already be de-duplicated and known to exist.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProduct,
        category_ids: &[DbId],
    ) -> Result<Product, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO products (name, price, description, user_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&insert_query)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.description)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_categories_inner(&mut tx, product.id, category_ids).await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a product by exact name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE name = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all products ordered by ID.
    pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY id");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// List all products owned by a user.
    pub async fn list_by_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, Product>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List all products that include the given category.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS} \
             FROM products p \
             JOIN product_categories pc ON pc.product_id = p.id \
             WHERE pc.category_id = $1 \
             ORDER BY p.id"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Number of products that include the given category.
    pub async fn count_by_category(pool: &PgPool, category_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_categories WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// List a user's products matching every supplied filter.
    ///
    /// `None` filters impose no constraint. Category membership is tested with
    /// `EXISTS` so a product appears at most once.
    pub async fn list_by_owner_filtered(
        pool: &PgPool,
        user_id: DbId,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS} \
             FROM products p \
             WHERE p.user_id = $1 \
               AND ($2::TEXT IS NULL OR p.name ILIKE $2 ESCAPE '\\') \
               AND ($3::DOUBLE PRECISION IS NULL OR p.price >= $3) \
               AND ($4::DOUBLE PRECISION IS NULL OR p.price <= $4) \
               AND ($5::BIGINT IS NULL OR EXISTS ( \
                    SELECT 1 FROM product_categories pc \
                    WHERE pc.product_id = p.id AND pc.category_id = $5)) \
             ORDER BY p.id"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(user_id)
            .bind(&filter.name_pattern)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.category_id)
            .fetch_all(pool)
            .await
    }

    /// Update a product's scalar fields and replace its category set.
    ///
    /// Only non-`None` scalar fields are applied. The category set is cleared
    /// and re-inserted from `category_ids`. Returns `None` if no product with
    /// the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        category_ids: &[DbId],
    ) -> Result<Option<Product>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                price = COALESCE($3, price), \
                description = COALESCE($4, description) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.description)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref product) = product {
            Self::set_categories_inner(&mut tx, product.id, category_ids).await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product by ID. Join rows cascade. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Category membership
    // -----------------------------------------------------------------------

    /// Category IDs currently linked to a product, ascending.
    pub async fn category_ids(pool: &PgPool, product_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT category_id FROM product_categories \
             WHERE product_id = $1 ORDER BY category_id",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Categories for a batch of products, one row per membership.
    pub async fn categories_for(
        pool: &PgPool,
        product_ids: &[DbId],
    ) -> Result<Vec<ProductCategoryRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductCategoryRow>(
            "SELECT pc.product_id, c.id, c.name, c.description \
             FROM product_categories pc \
             JOIN categories c ON c.id = pc.category_id \
             WHERE pc.product_id = ANY($1)",
        )
        .bind(product_ids)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace category memberships within an existing transaction.
    async fn set_categories_inner(
        tx: &mut Transaction<'_, Postgres>,
        product_id: DbId,
        category_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO product_categories (product_id, category_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(product_id)
        .bind(category_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
