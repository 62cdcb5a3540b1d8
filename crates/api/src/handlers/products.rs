//! Handlers for the `/products` resource.
//!
//! Every response carries the nested product view: owner summary, the
//! name-sorted category list, and the legacy single `category` field.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shopfront_core::types::DbId;
use shopfront_db::models::product::{CreateProduct, ProductResponse, UpdateProduct};

use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::services::product;
use crate::state::AppState;

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let view = product::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/products
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<ProductResponse>>> {
    let views = product::list(&state.pool).await?;
    Ok(Json(views))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductResponse>> {
    let view = product::get(&state.pool, id).await?;
    Ok(Json(view))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> AppResult<Json<ProductResponse>> {
    let view = product::update(&state.pool, id, &input).await?;
    Ok(Json(view))
}

/// DELETE /api/products/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    product::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/products/user/{user_id}
pub async fn list_by_owner(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let views = product::list_by_owner(&state.pool, user_id).await?;
    Ok(Json(views))
}

/// GET /api/products/category/{category_id}
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let views = product::list_by_category(&state.pool, category_id).await?;
    Ok(Json(views))
}
