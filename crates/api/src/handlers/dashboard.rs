//! Handler for the per-user dashboard.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use todo_core::pagination::RECENT_TODOS_LIMIT;
use todo_core::stats::TodoStats;
use todo_core::todo::TodoView;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Dashboard payload: whole-collection statistics plus the newest todos.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: TodoStats,
    /// Completed share in percent.
    pub completion_rate: f64,
    pub recent: Vec<TodoView>,
}

/// GET /api/v1/dashboard
///
/// Statistics ignore any filter; they always cover all of the caller's todos.
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let store = state.todo_store();
    let now = Utc::now();

    let stats = state.engine.summarize(&store, auth.user_id, now).await?;
    let recent = state
        .engine
        .recent(&store, auth.user_id, RECENT_TODOS_LIMIT)
        .await?;

    Ok(Json(DataResponse {
        data: Dashboard {
            completion_rate: stats.completion_rate(),
            stats,
            recent: recent.into_iter().map(|todo| todo.view(now)).collect(),
        },
    }))
}
