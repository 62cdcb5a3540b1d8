//! Domain types, rules, and the error taxonomy shared by the db and api crates.
//!
//! Nothing in this crate touches the database or HTTP; everything here is
//! pure and unit-tested in place.

pub mod catalog;
pub mod error;
pub mod filters;
pub mod types;
