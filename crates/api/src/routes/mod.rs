pub mod categories;
pub mod dashboard;
pub mod health;
pub mod todos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /todos                          query, create
/// /todos/{id}                     get, update, delete
/// /todos/{id}/toggle              flip completion (POST)
///
/// /categories                     list, create
/// /categories/{id}                update, delete
///
/// /dashboard                      statistics + recent todos
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/todos", todos::router())
        .nest("/categories", categories::router())
        .nest("/dashboard", dashboard::router())
}
