pub mod categories;
pub mod health;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                                      list, create
/// /categories/{id}                                 get, update, delete
/// /categories/{id}/product-count                   referencing product count
///
/// /products                                        list, create
/// /products/{id}                                   get, update, delete
/// /products/user/{user_id}                         products owned by a user
/// /products/category/{category_id}                 products in a category
///
/// /users                                           list, create
/// /users/{id}                                      get, update, patch, delete
/// /users/{id}/products                             owned products (filterable)
/// /users/{id}/products-v2                          same listing, legacy path
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/users", users::router())
}
