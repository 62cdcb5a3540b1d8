//! User service: unique emails, password hashing, and the owner-scoped
//! product listings.

use shopfront_core::catalog::{duplicate_email, validate_user_name};
use shopfront_core::error::CoreError;
use shopfront_core::types::DbId;
use shopfront_db::constraints::{is_unique_violation, UQ_USERS_EMAIL};
use shopfront_db::models::product::{ProductFilterParams, ProductResponse};
use shopfront_db::models::user::{
    CreateUser, NewUser, PatchUser, UpdateUser, UserChanges, UserResponse,
};
use shopfront_db::repositories::UserRepo;
use sqlx::PgPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::services::product;

/// Verify that a user exists.
pub async fn ensure_user_exists(pool: &PgPool, id: DbId) -> AppResult<()> {
    if UserRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

pub async fn list(pool: &PgPool) -> AppResult<Vec<UserResponse>> {
    let users = UserRepo::list(pool).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

pub async fn get(pool: &PgPool, id: DbId) -> AppResult<UserResponse> {
    let user = UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(user.into())
}

/// Register a user with a unique email. The password is stored as an Argon2id hash.
pub async fn create(
    pool: &PgPool,
    password_min_length: usize,
    input: &CreateUser,
) -> AppResult<UserResponse> {
    validate_user_name(&input.name).map_err(CoreError::Validation)?;
    validate_password_strength(&input.password, password_min_length)?;

    if UserRepo::find_by_email(pool, &input.email).await?.is_some() {
        return Err(CoreError::Conflict(duplicate_email(&input.email)).into());
    }

    let new_user = NewUser {
        name: input.name.clone(),
        email: input.email.clone(),
        password_hash: hash_password(&input.password)?,
    };

    let user = UserRepo::create(pool, &new_user)
        .await
        .map_err(|e| email_conflict(e, &input.email))?;

    tracing::info!(user_id = user.id, "User created");
    Ok(user.into())
}

/// Replace every field of a user (`PUT`).
pub async fn update(
    pool: &PgPool,
    password_min_length: usize,
    id: DbId,
    input: &UpdateUser,
) -> AppResult<UserResponse> {
    let patch = PatchUser {
        name: Some(input.name.clone()),
        email: Some(input.email.clone()),
        password: Some(input.password.clone()),
    };
    patch_user(pool, password_min_length, id, &patch).await
}

/// Apply only the fields present in `input` (`PATCH`).
pub async fn patch_user(
    pool: &PgPool,
    password_min_length: usize,
    id: DbId,
    input: &PatchUser,
) -> AppResult<UserResponse> {
    ensure_user_exists(pool, id).await?;

    if let Some(name) = &input.name {
        validate_user_name(name).map_err(CoreError::Validation)?;
    }

    if let Some(email) = &input.email {
        if let Some(holder) = UserRepo::find_by_email(pool, email).await? {
            if holder.id != id {
                return Err(CoreError::Conflict(duplicate_email(email)).into());
            }
        }
    }

    let password_hash = match &input.password {
        Some(password) => {
            validate_password_strength(password, password_min_length)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        name: input.name.clone(),
        email: input.email.clone(),
        password_hash,
    };

    let user = UserRepo::update(pool, id, &changes)
        .await
        .map_err(|e| email_conflict(e, input.email.as_deref().unwrap_or_default()))?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(
        user_id = id,
        password_changed = changes.password_hash.is_some(),
        "User updated",
    );
    Ok(user.into())
}

/// Delete a user.
///
/// No dependent check is made here: a user who still owns products is
/// protected by `fk_products_user_id` and the store error surfaces as 409.
pub async fn delete(pool: &PgPool, id: DbId) -> AppResult<()> {
    if UserRepo::delete(pool, id).await? {
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// Products owned by the user.
pub async fn list_products(pool: &PgPool, id: DbId) -> AppResult<Vec<ProductResponse>> {
    product::list_by_owner(pool, id).await
}

/// Products owned by the user, narrowed by the supplied filters.
pub async fn list_products_filtered(
    pool: &PgPool,
    id: DbId,
    params: &ProductFilterParams,
) -> AppResult<Vec<ProductResponse>> {
    product::list_by_owner_filtered(pool, id, params).await
}

fn email_conflict(err: sqlx::Error, email: &str) -> AppError {
    if is_unique_violation(&err, UQ_USERS_EMAIL) {
        CoreError::Conflict(duplicate_email(email)).into()
    } else {
        err.into()
    }
}
