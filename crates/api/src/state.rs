use std::sync::Arc;

use todo_core::engine::TodoQueryEngine;
use todo_db::store::PgTodoStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: todo_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Query engine configured with the server's paging limits.
    pub engine: TodoQueryEngine,
}

impl AppState {
    pub fn new(pool: todo_db::DbPool, config: ServerConfig) -> Self {
        let engine = TodoQueryEngine::new(config.query_limits());
        Self {
            pool,
            config: Arc::new(config),
            engine,
        }
    }

    /// Engine-facing view of the pool.
    pub fn todo_store(&self) -> PgTodoStore {
        PgTodoStore::new(self.pool.clone())
    }
}
