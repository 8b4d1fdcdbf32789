use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use todo_db::MigrationStatus;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database is reachable and fully migrated.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// `null` when the migrations table cannot be read.
    pub migrations: Option<MigrationStatus>,
    pub pool: PoolStats,
}

#[derive(Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// GET /health -- database reachability, schema version and pool usage.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = todo_db::health_check(&state.pool).await.is_ok();
    let migrations = match todo_db::migration_status(&state.pool).await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read migration status");
            None
        }
    };

    let current = migrations.is_some_and(|m| m.is_current());
    let status = if db_healthy && current { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        migrations,
        pool: PoolStats {
            size: state.pool.size(),
            idle: state.pool.num_idle(),
        },
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
