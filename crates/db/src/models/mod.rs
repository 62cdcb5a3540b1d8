//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO
//! - The `Serialize` response shapes returned over HTTP

pub mod category;
pub mod product;
pub mod user;
