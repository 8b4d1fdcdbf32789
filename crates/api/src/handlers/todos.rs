//! Handlers for todo querying and CRUD.
//!
//! All endpoints require authentication via [`AuthUser`]; the caller's id
//! scopes every read and write. Todos are returned with their derived
//! `is_overdue` and `days_until_due` fields evaluated at request time.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use todo_core::error::CoreError;
use todo_core::filter::RawTodoFilter;
use todo_core::todo::TodoView;
use todo_core::types::{DbId, OwnerId};
use todo_db::models::todo::{CreateTodo, UpdateTodo};
use todo_db::repositories::{CategoryRepo, TodoRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/todos
///
/// Filter, sort and paginate the caller's todos. Unknown query keys are
/// ignored; invalid values yield 400 `INVALID_FILTER`.
pub async fn list_todos(
    auth: AuthUser,
    State(state): State<AppState>,
    query: Result<Query<RawTodoFilter>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(filter) = query?;
    let page = state
        .engine
        .query(&state.todo_store(), auth.user_id, &filter)
        .await?;

    tracing::debug!(
        user_id = auth.user_id,
        total = page.total,
        completed = page.completed,
        page = page.page_info.page,
        "Todos queried",
    );

    let now = Utc::now();
    Ok(Json(DataResponse {
        data: page.map(|todo| todo.view(now)),
    }))
}

/// POST /api/v1/todos
pub async fn create_todo(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTodo>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(category_id) = input.category_id {
        ensure_category(&state, auth.user_id, category_id).await?;
    }

    let todo = TodoRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(todo_id = todo.id, user_id = auth.user_id, "Todo created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: todo.view(Utc::now()),
        }),
    ))
}

/// GET /api/v1/todos/{id}
pub async fn get_todo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(todo_id): Path<DbId>,
) -> AppResult<Json<DataResponse<TodoView>>> {
    let todo = TodoRepo::find_by_id(&state.pool, auth.user_id, todo_id)
        .await?
        .ok_or(todo_not_found(todo_id))?;

    Ok(Json(DataResponse {
        data: todo.view(Utc::now()),
    }))
}

/// PUT /api/v1/todos/{id}
///
/// Partial update. `category_id` and `due_date` may be set to `null` to
/// clear them.
pub async fn update_todo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(todo_id): Path<DbId>,
    Json(input): Json<UpdateTodo>,
) -> AppResult<Json<DataResponse<TodoView>>> {
    input.validate()?;
    if let Some(Some(category_id)) = input.category_id {
        ensure_category(&state, auth.user_id, category_id).await?;
    }

    let todo = TodoRepo::update(&state.pool, auth.user_id, todo_id, &input)
        .await?
        .ok_or(todo_not_found(todo_id))?;

    tracing::info!(todo_id, user_id = auth.user_id, "Todo updated");

    Ok(Json(DataResponse {
        data: todo.view(Utc::now()),
    }))
}

/// DELETE /api/v1/todos/{id}
pub async fn delete_todo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(todo_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = TodoRepo::delete(&state.pool, auth.user_id, todo_id).await?;
    if !deleted {
        return Err(todo_not_found(todo_id));
    }

    tracing::info!(todo_id, user_id = auth.user_id, "Todo deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/todos/{id}/toggle
///
/// Flip the completed flag.
pub async fn toggle_todo(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(todo_id): Path<DbId>,
) -> AppResult<Json<DataResponse<TodoView>>> {
    let todo = TodoRepo::toggle(&state.pool, auth.user_id, todo_id)
        .await?
        .ok_or(todo_not_found(todo_id))?;

    tracing::info!(
        todo_id,
        user_id = auth.user_id,
        completed = todo.completed,
        "Todo toggled",
    );

    Ok(Json(DataResponse {
        data: todo.view(Utc::now()),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn todo_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Todo", id })
}

/// Reject a category id that is missing or belongs to someone else.
async fn ensure_category(state: &AppState, owner: OwnerId, category_id: DbId) -> AppResult<()> {
    if CategoryRepo::exists(&state.pool, owner, category_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Category {category_id} does not exist"
        ))))
    }
}
