//! PostgreSQL persistence for todos and categories.
//!
//! - [`models`] -- row structs and create/update DTOs.
//! - [`repositories`] -- zero-sized repos taking `&PgPool`.
//! - [`store::PgTodoStore`] -- the query engine's [`TodoStore`](todo_core::store::TodoStore)
//!   backed by the todo repository.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Migrations bundled with this build versus those applied to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub known: i64,
    pub applied: i64,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

/// Count successfully applied migrations.
///
/// Fails if the migrations table does not exist yet.
pub async fn migration_status(pool: &DbPool) -> Result<MigrationStatus, sqlx::Error> {
    let applied = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*)::BIGINT FROM _sqlx_migrations WHERE success",
    )
    .fetch_one(pool)
    .await?;

    Ok(MigrationStatus {
        known: MIGRATOR.iter().count() as i64,
        applied,
    })
}
