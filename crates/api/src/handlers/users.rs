//! Handlers for the `/users` resource, including the owner-scoped product listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shopfront_core::types::DbId;
use shopfront_db::models::product::{ProductFilterParams, ProductResponse};
use shopfront_db::models::user::{CreateUser, PatchUser, UpdateUser, UserResponse};

use crate::error::AppResult;
use crate::extract::{ApiQuery, ValidatedJson};
use crate::services::user;
use crate::state::AppState;

/// POST /api/users
///
/// Hashes the password before storage and returns 201 with a [`UserResponse`].
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let created = user::create(&state.pool, state.config.password_min_length, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::list(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let found = user::get(&state.pool, id).await?;
    Ok(Json(found))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    let updated = user::update(&state.pool, state.config.password_min_length, id, &input).await?;
    Ok(Json(updated))
}

/// PATCH /api/users/{id}
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<PatchUser>,
) -> AppResult<Json<UserResponse>> {
    let updated =
        user::patch_user(&state.pool, state.config.password_min_length, id, &input).await?;
    Ok(Json(updated))
}

/// DELETE /api/users/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    user::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/{id}/products
///
/// Optional `name`, `minPrice`, `maxPrice` and `categoryId` query parameters
/// narrow the result; with none supplied every owned product is returned.
pub async fn list_products(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ApiQuery(params): ApiQuery<ProductFilterParams>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let views = if params.is_empty() {
        user::list_products(&state.pool, id).await?
    } else {
        user::list_products_filtered(&state.pool, id, &params).await?
    };
    Ok(Json(views))
}
