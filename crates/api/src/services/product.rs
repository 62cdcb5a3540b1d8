//! Product service: owner and category resolution, the category set, and
//! assembly of the nested product view.

use std::collections::HashMap;

use shopfront_core::catalog::{
    category_id_set, duplicate_product_name, validate_price, validate_product_description,
    validate_product_name,
};
use shopfront_core::error::CoreError;
use shopfront_core::types::DbId;
use shopfront_db::constraints::{
    is_foreign_key_violation, is_unique_violation, FK_PRODUCTS_USER_ID,
    FK_PRODUCT_CATEGORIES_CATEGORY_ID, UQ_PRODUCTS_NAME,
};
use shopfront_db::models::category::CategorySummary;
use shopfront_db::models::product::{
    CreateProduct, Product, ProductFilter, ProductFilterParams, ProductResponse, UpdateProduct,
};
use shopfront_db::models::user::UserSummary;
use shopfront_db::repositories::{CategoryRepo, ProductRepo, UserRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::category::ensure_category_exists;
use crate::services::user::ensure_user_exists;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a product exists, returning the full row.
async fn ensure_product_exists(pool: &PgPool, id: DbId) -> AppResult<Product> {
    ProductRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        })
    })
}

/// De-duplicate requested category ids and confirm every one exists.
///
/// Ids are checked in ascending order; the first missing id is reported.
async fn resolve_categories(pool: &PgPool, requested: &[DbId]) -> AppResult<Vec<DbId>> {
    let ids = category_id_set(requested)?;
    let existing = CategoryRepo::existing_ids(pool, &ids).await?;

    if let Some(&missing) = ids.iter().find(|id| existing.binary_search(id).is_err()) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: missing,
        }));
    }
    Ok(ids)
}

/// Translate a store rejection of a product write into the domain error.
///
/// The owner and categories were checked before the write, but may have been
/// deleted since. A vanished category is reported by re-resolving the set.
async fn write_rejection(
    pool: &PgPool,
    err: sqlx::Error,
    owner_id: Option<DbId>,
    category_ids: &[DbId],
    name: &str,
) -> AppError {
    if is_unique_violation(&err, UQ_PRODUCTS_NAME) {
        return CoreError::Conflict(duplicate_product_name(name)).into();
    }
    if let Some(id) = owner_id.filter(|_| is_foreign_key_violation(&err, FK_PRODUCTS_USER_ID)) {
        return CoreError::NotFound { entity: "User", id }.into();
    }
    if is_foreign_key_violation(&err, FK_PRODUCT_CATEGORIES_CATEGORY_ID) {
        if let Err(missing) = resolve_categories(pool, category_ids).await {
            return missing;
        }
    }
    err.into()
}

/// Assemble views for a batch of products with one owner query and one
/// category query, preserving input order.
pub async fn load_views(pool: &PgPool, products: Vec<Product>) -> AppResult<Vec<ProductResponse>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let mut owner_ids: Vec<DbId> = products.iter().map(|p| p.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();
    let product_ids: Vec<DbId> = products.iter().map(|p| p.id).collect();

    let owners: HashMap<DbId, UserSummary> = UserRepo::find_summaries(pool, &owner_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut categories: HashMap<DbId, Vec<CategorySummary>> = HashMap::new();
    for row in ProductRepo::categories_for(pool, &product_ids).await? {
        categories
            .entry(row.product_id)
            .or_default()
            .push(row.into());
    }

    products
        .into_iter()
        .map(|product| -> AppResult<ProductResponse> {
            let owner = owners.get(&product.user_id).cloned().ok_or_else(|| {
                CoreError::Internal(format!(
                    "Product {} references missing user {}",
                    product.id, product.user_id
                ))
            })?;
            let cats = categories.remove(&product.id).unwrap_or_default();
            Ok(ProductResponse::assemble(product, owner, cats))
        })
        .collect()
}

async fn load_view(pool: &PgPool, product: Product) -> AppResult<ProductResponse> {
    let id = product.id;
    load_views(pool, vec![product])
        .await?
        .pop()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create a product owned by an existing user, in at least one existing category.
pub async fn create(pool: &PgPool, input: &CreateProduct) -> AppResult<ProductResponse> {
    validate_product_name(&input.name).map_err(CoreError::Validation)?;
    validate_price(input.price).map_err(CoreError::Validation)?;
    validate_product_description(input.description.as_deref()).map_err(CoreError::Validation)?;

    ensure_user_exists(pool, input.user_id).await?;
    let category_ids = resolve_categories(pool, &input.category_ids).await?;

    if ProductRepo::find_by_name(pool, &input.name).await?.is_some() {
        return Err(CoreError::Conflict(duplicate_product_name(&input.name)).into());
    }

    let product = match ProductRepo::create(pool, input, &category_ids).await {
        Ok(product) => product,
        Err(e) => {
            return Err(
                write_rejection(pool, e, Some(input.user_id), &category_ids, &input.name).await,
            )
        }
    };

    tracing::info!(
        product_id = product.id,
        user_id = product.user_id,
        categories = category_ids.len(),
        "Product created",
    );
    load_view(pool, product).await
}

/// Partially update a product and replace its category set.
///
/// Absent scalar fields keep their stored values. The name is not checked
/// against other products here; the unique constraint still applies.
pub async fn update(pool: &PgPool, id: DbId, input: &UpdateProduct) -> AppResult<ProductResponse> {
    ensure_product_exists(pool, id).await?;

    if let Some(name) = &input.name {
        validate_product_name(name).map_err(CoreError::Validation)?;
    }
    if let Some(price) = input.price {
        validate_price(price).map_err(CoreError::Validation)?;
    }
    validate_product_description(input.description.as_deref()).map_err(CoreError::Validation)?;

    let category_ids = resolve_categories(pool, &input.category_ids).await?;

    let updated = match ProductRepo::update(pool, id, input, &category_ids).await {
        Ok(updated) => updated,
        Err(e) => {
            let name = input.name.as_deref().unwrap_or_default();
            return Err(write_rejection(pool, e, None, &category_ids, name).await);
        }
    };
    let product = updated.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    }))?;

    tracing::info!(product_id = id, categories = category_ids.len(), "Product updated");
    load_view(pool, product).await
}

pub async fn delete(pool: &PgPool, id: DbId) -> AppResult<()> {
    if ProductRepo::delete(pool, id).await? {
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))
    }
}

pub async fn get(pool: &PgPool, id: DbId) -> AppResult<ProductResponse> {
    let product = ensure_product_exists(pool, id).await?;
    load_view(pool, product).await
}

pub async fn list(pool: &PgPool) -> AppResult<Vec<ProductResponse>> {
    let products = ProductRepo::list(pool).await?;
    load_views(pool, products).await
}

/// Every product owned by an existing user.
pub async fn list_by_owner(pool: &PgPool, user_id: DbId) -> AppResult<Vec<ProductResponse>> {
    ensure_user_exists(pool, user_id).await?;
    let products = ProductRepo::list_by_owner(pool, user_id).await?;
    load_views(pool, products).await
}

/// Every product that includes an existing category.
pub async fn list_by_category(
    pool: &PgPool,
    category_id: DbId,
) -> AppResult<Vec<ProductResponse>> {
    ensure_category_exists(pool, category_id).await?;
    let products = ProductRepo::list_by_category(pool, category_id).await?;
    load_views(pool, products).await
}

/// A user's products narrowed by every supplied filter.
pub async fn list_by_owner_filtered(
    pool: &PgPool,
    user_id: DbId,
    params: &ProductFilterParams,
) -> AppResult<Vec<ProductResponse>> {
    ensure_user_exists(pool, user_id).await?;
    let filter = ProductFilter::try_from(params)?;

    let products = ProductRepo::list_by_owner_filtered(pool, user_id, &filter).await?;
    tracing::debug!(user_id, matched = products.len(), ?filter, "Filtered owner products");
    load_views(pool, products).await
}
