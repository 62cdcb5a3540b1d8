//! Catalog constants and validation functions for users, categories, and products.
//!
//! These rules mirror the DTO-level `validator` attributes so that service
//! code can re-check inputs that did not arrive through an HTTP handler.

use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum length of a product name in characters.
pub const PRODUCT_NAME_MIN_LENGTH: usize = 3;

/// Maximum length of a product name in characters.
pub const PRODUCT_NAME_MAX_LENGTH: usize = 150;

/// Maximum length of a product description in characters.
pub const PRODUCT_DESCRIPTION_MAX_LENGTH: usize = 500;

/// Maximum length of a category name in characters.
pub const CATEGORY_NAME_MAX_LENGTH: usize = 100;

/// Maximum length of a user display name in characters.
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Default minimum password length when `PASSWORD_MIN_LENGTH` is unset.
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Validate a product name: non-blank, 3 to 150 characters.
pub fn validate_product_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Product name must not be blank".to_string());
    }
    if !(PRODUCT_NAME_MIN_LENGTH..=PRODUCT_NAME_MAX_LENGTH).contains(&len) {
        return Err(format!(
            "Product name must be between {PRODUCT_NAME_MIN_LENGTH} and \
             {PRODUCT_NAME_MAX_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a product price: finite and strictly positive.
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err("Price must be greater than 0".to_string());
    }
    Ok(())
}

/// Validate an optional product description (at most 500 characters).
pub fn validate_product_description(description: Option<&str>) -> Result<(), String> {
    match description {
        Some(d) if d.chars().count() > PRODUCT_DESCRIPTION_MAX_LENGTH => Err(format!(
            "Description must not exceed {PRODUCT_DESCRIPTION_MAX_LENGTH} characters"
        )),
        _ => Ok(()),
    }
}

/// Collapse a list of category ids into a set, ordered ascending.
///
/// The join relation is a set, so duplicates in the request are ignored.
/// An empty set is rejected: every product belongs to at least one category.
pub fn category_id_set(ids: &[DbId]) -> Result<Vec<DbId>, CoreError> {
    let set: BTreeSet<DbId> = ids.iter().copied().collect();
    if set.is_empty() {
        return Err(CoreError::Validation(
            "A product must belong to at least one category".to_string(),
        ));
    }
    Ok(set.into_iter().collect())
}

/// Message for a product whose name is already taken.
pub fn duplicate_product_name(name: &str) -> String {
    format!("A product named '{name}' already exists")
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Validate a category name: non-blank, at most 100 characters.
pub fn validate_category_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("Category name must not be blank".to_string());
    }
    if len > CATEGORY_NAME_MAX_LENGTH {
        return Err(format!(
            "Category name must not exceed {CATEGORY_NAME_MAX_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Message for a category whose name is already taken.
pub fn duplicate_category_name(name: &str) -> String {
    format!("A category named '{name}' already exists")
}

/// Message for a category that cannot be deleted because products use it.
pub fn category_in_use(product_count: i64) -> String {
    format!("Cannot delete category: it is referenced by {product_count} product(s)")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Validate a user display name: non-blank, at most 150 characters.
pub fn validate_user_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err("User name must not be blank".to_string());
    }
    if len > USER_NAME_MAX_LENGTH {
        return Err(format!(
            "User name must not exceed {USER_NAME_MAX_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Message for an email address that is already registered.
pub fn duplicate_email(email: &str) -> String {
    format!("The email '{email}' is already registered")
}
