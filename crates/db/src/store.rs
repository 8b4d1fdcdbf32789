//! PostgreSQL-backed [`TodoStore`].

use todo_core::filter::TodoPredicate;
use todo_core::pagination::PageWindow;
use todo_core::sort::TodoOrder;
use todo_core::stats::TodoStats;
use todo_core::store::{MatchedPage, TodoStore};
use todo_core::todo::Todo;
use todo_core::types::{DbId, OwnerId, Timestamp};

use crate::repositories::{CategoryRepo, TodoRepo};
use crate::DbPool;

/// Runs engine queries through [`TodoRepo`] and [`CategoryRepo`].
///
/// Cheap to clone; the pool is reference-counted.
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: DbPool,
}

impl PgTodoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl TodoStore for PgTodoStore {
    type Error = sqlx::Error;

    async fn find_todos(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<Vec<Todo>, Self::Error> {
        TodoRepo::find_matching(&self.pool, owner, predicate, order, window).await
    }

    async fn find_page(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<MatchedPage, Self::Error> {
        TodoRepo::find_page(&self.pool, owner, predicate, order, window).await
    }

    async fn todo_stats(&self, owner: OwnerId, now: Timestamp) -> Result<TodoStats, Self::Error> {
        TodoRepo::stats(&self.pool, owner, now).await
    }

    async fn category_exists(&self, owner: OwnerId, category_id: DbId) -> Result<bool, Self::Error> {
        CategoryRepo::exists(&self.pool, owner, category_id).await
    }
}
