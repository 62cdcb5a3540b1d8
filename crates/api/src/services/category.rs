//! Category service: unique names and protection of categories still in use.

use shopfront_core::catalog::{category_in_use, duplicate_category_name, validate_category_name};
use shopfront_core::error::CoreError;
use shopfront_core::types::DbId;
use shopfront_db::constraints::{
    is_foreign_key_violation, is_unique_violation, FK_PRODUCT_CATEGORIES_CATEGORY_ID,
    UQ_CATEGORIES_NAME,
};
use shopfront_db::models::category::{
    Category, CategoryProductCount, CreateCategory, UpdateCategory,
};
use shopfront_db::repositories::{CategoryRepo, ProductRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Verify that a category exists, returning the full row.
pub async fn ensure_category_exists(pool: &PgPool, id: DbId) -> AppResult<Category> {
    CategoryRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        })
    })
}

/// All categories, ordered by name.
pub async fn list(pool: &PgPool) -> AppResult<Vec<Category>> {
    Ok(CategoryRepo::list(pool).await?)
}

pub async fn get(pool: &PgPool, id: DbId) -> AppResult<Category> {
    ensure_category_exists(pool, id).await
}

/// Create a category whose name is not already taken (exact match).
pub async fn create(pool: &PgPool, input: &CreateCategory) -> AppResult<Category> {
    validate_category_name(&input.name).map_err(CoreError::Validation)?;

    if CategoryRepo::find_by_name(pool, &input.name).await?.is_some() {
        return Err(CoreError::Conflict(duplicate_category_name(&input.name)).into());
    }

    let category = CategoryRepo::create(pool, input)
        .await
        .map_err(|e| name_conflict(e, &input.name))?;

    tracing::info!(category_id = category.id, name = %category.name, "Category created");
    Ok(category)
}

/// Overwrite a category's name and description.
///
/// The new name must not match any *other* category, ignoring case.
pub async fn update(pool: &PgPool, id: DbId, input: &UpdateCategory) -> AppResult<Category> {
    ensure_category_exists(pool, id).await?;
    validate_category_name(&input.name).map_err(CoreError::Validation)?;

    if let Some(existing) = CategoryRepo::find_by_name_ci(pool, &input.name).await? {
        if existing.id != id {
            return Err(CoreError::Conflict(duplicate_category_name(&input.name)).into());
        }
    }

    let category = CategoryRepo::update(pool, id, input)
        .await
        .map_err(|e| name_conflict(e, &input.name))?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))?;

    tracing::info!(category_id = id, name = %category.name, "Category updated");
    Ok(category)
}

/// Delete a category that no product references.
pub async fn delete(pool: &PgPool, id: DbId) -> AppResult<()> {
    ensure_category_exists(pool, id).await?;

    let in_use = ProductRepo::count_by_category(pool, id).await?;
    if in_use > 0 {
        return Err(CoreError::Conflict(category_in_use(in_use)).into());
    }

    match CategoryRepo::delete(pool, id).await {
        Ok(true) => {
            tracing::info!(category_id = id, "Category deleted");
            Ok(())
        }
        Ok(false) => Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        })),
        // A product picked up this category after the count above.
        Err(e) if is_foreign_key_violation(&e, FK_PRODUCT_CATEGORIES_CATEGORY_ID) => {
            let in_use = ProductRepo::count_by_category(pool, id).await?;
            Err(CoreError::Conflict(category_in_use(in_use)).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Number of products that include the category.
pub async fn product_count(pool: &PgPool, id: DbId) -> AppResult<CategoryProductCount> {
    ensure_category_exists(pool, id).await?;
    let product_count = ProductRepo::count_by_category(pool, id).await?;
    Ok(CategoryProductCount {
        category_id: id,
        product_count,
    })
}

fn name_conflict(err: sqlx::Error, name: &str) -> AppError {
    if is_unique_violation(&err, UQ_CATEGORIES_NAME) {
        CoreError::Conflict(duplicate_category_name(name)).into()
    } else {
        err.into()
    }
}
