//! Handlers for category CRUD.
//!
//! Names are unique per owner; a duplicate maps to 409 through the
//! `uq_categories_owner_name` constraint. Deleting a category leaves its
//! todos in place with no category.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use todo_core::error::CoreError;
use todo_core::types::DbId;
use todo_db::models::category::{Category, CreateCategory, UpdateCategory};
use todo_db::repositories::CategoryRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = CategoryRepo::list(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let category = CategoryRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        category_id = category.id,
        user_id = auth.user_id,
        name = %category.name,
        "Category created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    input.validate()?;

    let category = CategoryRepo::update(&state.pool, auth.user_id, category_id, &input)
        .await?
        .ok_or(category_not_found(category_id))?;

    tracing::info!(category_id, user_id = auth.user_id, "Category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CategoryRepo::delete(&state.pool, auth.user_id, category_id).await?;
    if !deleted {
        return Err(category_not_found(category_id));
    }

    tracing::info!(category_id, user_id = auth.user_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}
