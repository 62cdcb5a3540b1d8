//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// PATCH  /{id}                -> patch
/// DELETE /{id}                -> delete
/// GET    /{id}/products       -> list_products
/// GET    /{id}/products-v2    -> list_products
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::get_by_id)
                .put(users::update)
                .patch(users::patch)
                .delete(users::delete),
        )
        .route("/{id}/products", get(users::list_products))
        .route("/{id}/products-v2", get(users::list_products))
}
