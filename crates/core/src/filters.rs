//! Normalisation of the optional product filters used by owner-scoped queries.
//!
//! The filters themselves are applied in SQL; this module only prepares the
//! bind values so the query can treat `NULL` as "no constraint".

use crate::error::CoreError;

/// Escape character used in the `ILIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character itself so user input is matched
/// literally inside a `LIKE` pattern.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Build a case-insensitive substring pattern from an optional name filter.
///
/// Blank or whitespace-only input is treated as no filter.
pub fn name_pattern(name: Option<&str>) -> Option<String> {
    let trimmed = name?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("%{}%", escape_like(trimmed)))
}

/// Reject price bounds that cannot match anything or are not numbers.
pub fn validate_price_range(min: Option<f64>, max: Option<f64>) -> Result<(), CoreError> {
    for bound in [min, max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(CoreError::Validation(
                "Price filters must be finite numbers".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "minPrice ({min}) must not be greater than maxPrice ({max})"
            )));
        }
    }
    Ok(())
}
