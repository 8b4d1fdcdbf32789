//! Persistence seam for the query engine.
//!
//! [`TodoStore`] is the capability the engine needs from a data-access
//! layer: owner-scoped reads driven by a [`TodoPredicate`], whole-collection
//! statistics, and an owner-scoped category lookup. Operations that return
//! several numbers read them from one snapshot, so a concurrent write is seen
//! either entirely or not at all. The PostgreSQL implementation lives in the
//! `db` crate; [`InMemoryTodoStore`] evaluates the same predicate and order
//! in process.

use std::convert::Infallible;
use std::future::Future;

use crate::filter::TodoPredicate;
use crate::pagination::PageWindow;
use crate::sort::TodoOrder;
use crate::stats::TodoStats;
use crate::todo::Todo;
use crate::types::{DbId, OwnerId, Timestamp};

/// One window of matching todos with counts over the whole matching set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedPage {
    pub items: Vec<Todo>,
    /// Matching rows before pagination.
    pub total: i64,
    /// Completed rows among `total`.
    pub completed: i64,
}

/// Owner-scoped read access to todos and categories.
pub trait TodoStore: Send + Sync {
    /// Error reported by the underlying storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Todos of `owner` matching `predicate`, ordered by `order`, restricted
    /// to `window`.
    fn find_todos(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> impl Future<Output = Result<Vec<Todo>, Self::Error>> + Send;

    /// The `window` of matching todos together with the matching counts,
    /// all read from the same snapshot. A window past the end has no items.
    fn find_page(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> impl Future<Output = Result<MatchedPage, Self::Error>> + Send;

    /// Statistics over all of `owner`'s todos, read from one snapshot.
    fn todo_stats(
        &self,
        owner: OwnerId,
        now: Timestamp,
    ) -> impl Future<Output = Result<TodoStats, Self::Error>> + Send;

    /// Whether `category_id` is a category belonging to `owner`.
    fn category_exists(
        &self,
        owner: OwnerId,
        category_id: DbId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A [`TodoStore`] over plain vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    todos: Vec<Todo>,
    categories: Vec<(OwnerId, DbId)>,
}

impl InMemoryTodoStore {
    pub fn new(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            categories: Vec::new(),
        }
    }

    /// Register a category owned by `owner`.
    pub fn add_category(&mut self, owner: OwnerId, category_id: DbId) {
        self.categories.push((owner, category_id));
    }

    pub fn insert(&mut self, todo: Todo) {
        self.todos.push(todo);
    }

    /// Remove a category, detaching (not deleting) the todos that used it.
    pub fn delete_category(&mut self, owner: OwnerId, category_id: DbId) -> bool {
        let before = self.categories.len();
        self.categories
            .retain(|&(o, id)| !(o == owner && id == category_id));
        let removed = self.categories.len() != before;
        if removed {
            for todo in self
                .todos
                .iter_mut()
                .filter(|t| t.owner_id == owner && t.category_id == Some(category_id))
            {
                todo.category_id = None;
            }
        }
        removed
    }

    fn matching<'a>(
        &'a self,
        owner: OwnerId,
        predicate: &'a TodoPredicate,
    ) -> impl Iterator<Item = &'a Todo> + 'a {
        self.todos
            .iter()
            .filter(move |t| t.owner_id == owner && predicate.matches(t))
    }
}

fn apply_window(rows: Vec<Todo>, window: PageWindow) -> Vec<Todo> {
    let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(0);
    rows.into_iter().skip(offset).take(limit).collect()
}

impl TodoStore for InMemoryTodoStore {
    type Error = Infallible;

    async fn find_todos(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<Vec<Todo>, Self::Error> {
        let mut rows: Vec<Todo> = self.matching(owner, predicate).cloned().collect();
        order.sort(&mut rows);
        Ok(apply_window(rows, window))
    }

    async fn find_page(
        &self,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<MatchedPage, Self::Error> {
        let mut rows: Vec<Todo> = self.matching(owner, predicate).cloned().collect();
        let total = rows.len() as i64;
        let completed = rows.iter().filter(|t| t.completed).count() as i64;
        order.sort(&mut rows);
        Ok(MatchedPage {
            items: apply_window(rows, window),
            total,
            completed,
        })
    }

    async fn todo_stats(&self, owner: OwnerId, now: Timestamp) -> Result<TodoStats, Self::Error> {
        Ok(TodoStats::from_todos(
            self.todos.iter().filter(|t| t.owner_id == owner),
            now,
        ))
    }

    async fn category_exists(
        &self,
        owner: OwnerId,
        category_id: DbId,
    ) -> Result<bool, Self::Error> {
        Ok(self.categories.contains(&(owner, category_id)))
    }
}
