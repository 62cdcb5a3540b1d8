//! Business rules that sit between the HTTP handlers and the repositories.
//!
//! Each service checks existence, uniqueness, and referential rules before
//! touching the store, then translates the named constraint violations the
//! store may still raise under concurrent writers into the same domain errors.

pub mod category;
pub mod product;
pub mod user;
