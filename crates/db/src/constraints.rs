//! Named store constraints and helpers to recognise their violations.
//!
//! Uniqueness and referential checks in the service layer are a fast path;
//! these constraints are what actually guarantees the invariants under
//! concurrent writers. Names follow the `uq_` / `fk_` / `ck_` convention so the
//! HTTP error classifier can map them without knowing each table.

/// PostgreSQL SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

pub const UQ_USERS_EMAIL: &str = "uq_users_email";
pub const UQ_CATEGORIES_NAME: &str = "uq_categories_name";
pub const UQ_PRODUCTS_NAME: &str = "uq_products_name";
pub const FK_PRODUCTS_USER_ID: &str = "fk_products_user_id";
pub const FK_PRODUCT_CATEGORIES_CATEGORY_ID: &str = "fk_product_categories_category_id";

/// `true` if `err` is a unique violation of the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    violates(err, UNIQUE_VIOLATION, constraint)
}

/// `true` if `err` is a foreign-key violation of the named constraint.
pub fn is_foreign_key_violation(err: &sqlx::Error, constraint: &str) -> bool {
    violates(err, FOREIGN_KEY_VIOLATION, constraint)
}

fn violates(err: &sqlx::Error, code: &str, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(code) && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
