//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use shopfront_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Category summary nested inside product views.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CategorySummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// Request body for `POST /categories`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "must not exceed 500 characters"))]
    pub description: Option<String>,
}

/// Request body for `PUT /categories/{id}`. Both fields overwrite the stored row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "must not exceed 500 characters"))]
    pub description: Option<String>,
}

/// Response body for `GET /categories/{id}/product-count`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProductCount {
    pub category_id: DbId,
    pub product_count: i64,
}
