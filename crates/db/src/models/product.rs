//! Product entity model, DTOs, and the nested response view.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use shopfront_core::error::CoreError;
use shopfront_core::filters::{name_pattern, validate_price_range};
use shopfront_core::types::{DbId, Timestamp};
use validator::Validate;

use super::category::CategorySummary;
use super::user::UserSummary;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category joined through `product_categories`, tagged with the product it
/// belongs to. Used to batch-load categories for a page of products.
#[derive(Debug, Clone, FromRow)]
pub struct ProductCategoryRow {
    pub product_id: DbId,
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

impl From<ProductCategoryRow> for CategorySummary {
    fn from(row: ProductCategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// Request body for `POST /products`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 3, max = 150, message = "must be between 3 and 150 characters"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than 0"))]
    pub price: f64,
    #[validate(length(max = 500, message = "must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Owning user. Immutable once the product exists.
    pub user_id: DbId,
    #[validate(length(min = 1, message = "must contain at least one category"))]
    pub category_ids: Vec<DbId>,
}

/// Request body for `PUT /products/{id}`.
///
/// Scalar fields are a partial overwrite; `category_ids` always replaces the
/// whole category set.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 3, max = 150, message = "must be between 3 and 150 characters"))]
    pub name: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than 0"))]
    pub price: Option<f64>,
    #[validate(length(max = 500, message = "must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "must contain at least one category"))]
    pub category_ids: Vec<DbId>,
}

/// Query parameters for `GET /users/{id}/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilterParams {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Only products that include this category.
    pub category_id: Option<DbId>,
}

impl ProductFilterParams {
    /// `true` if no filter was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.category_id.is_none()
    }
}

/// Bind-ready filter values. `None` means "no constraint" in SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Escaped `ILIKE` pattern, already wrapped in `%...%`.
    pub name_pattern: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub category_id: Option<DbId>,
}

impl TryFrom<&ProductFilterParams> for ProductFilter {
    type Error = CoreError;

    fn try_from(params: &ProductFilterParams) -> Result<Self, Self::Error> {
        validate_price_range(params.min_price, params.max_price)?;
        Ok(Self {
            name_pattern: name_pattern(params.name.as_deref()),
            min_price: params.min_price,
            max_price: params.max_price,
            category_id: params.category_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Response view
// ---------------------------------------------------------------------------

/// Nested read model returned by every product endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub user: UserSummary,
    /// All categories, sorted by name ascending.
    pub categories: Vec<CategorySummary>,
    /// Legacy single-category field: the first entry of `categories`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductResponse {
    /// Build the view for a persisted product.
    ///
    /// Categories are sorted by name (ties broken by id). An empty category
    /// list yields `category: None` rather than an error.
    pub fn assemble(
        product: Product,
        user: UserSummary,
        mut categories: Vec<CategorySummary>,
    ) -> Self {
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let category = categories.first().cloned();

        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            description: product.description,
            user,
            categories,
            category,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
