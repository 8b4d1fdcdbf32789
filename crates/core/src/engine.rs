//! Todo query engine: filter → sort → paginate, plus dashboard statistics.
//!
//! The engine is stateless. Every call takes the owner explicitly and reads
//! through a [`TodoStore`]; nothing is cached between calls.

use serde::Serialize;

use crate::error::{InvalidFilterError, QueryError};
use crate::filter::{CategoryFilter, FilterSpec, RawTodoFilter, TodoPredicate};
use crate::pagination::{PageInfo, PageWindow, QueryLimits};
use crate::sort::TodoOrder;
use crate::stats::TodoStats;
use crate::store::TodoStore;
use crate::todo::Todo;
use crate::types::{OwnerId, Timestamp};

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoPage<T = Todo> {
    pub items: Vec<T>,
    /// Matching rows before pagination.
    pub total: i64,
    /// Completed rows among `total`.
    pub completed: i64,
    pub page_info: PageInfo,
}

impl<T> TodoPage<T> {
    /// Transform each item, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> TodoPage<U> {
        TodoPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            completed: self.completed,
            page_info: self.page_info,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TodoQueryEngine {
    limits: QueryLimits,
}

impl TodoQueryEngine {
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// Validate `raw` and return the requested page of `owner`'s todos.
    ///
    /// A page past the end yields no items, not an error.
    pub async fn query<S: TodoStore>(
        &self,
        store: &S,
        owner: OwnerId,
        raw: &RawTodoFilter,
    ) -> Result<TodoPage, QueryError<S::Error>> {
        let spec = FilterSpec::parse(raw, &self.limits)?;

        if let Some(CategoryFilter::Id(id)) = spec.predicate.category {
            let exists = store
                .category_exists(owner, id)
                .await
                .map_err(QueryError::Persistence)?;
            if !exists {
                return Err(InvalidFilterError::new("category", format!("unknown category {id}")).into());
            }
        }

        self.execute(store, owner, &spec)
            .await
            .map_err(QueryError::Persistence)
    }

    /// Run an already validated spec.
    ///
    /// Items and counts come from a single store read, so `total` always
    /// describes the same rows the page was cut from.
    pub async fn execute<S: TodoStore>(
        &self,
        store: &S,
        owner: OwnerId,
        spec: &FilterSpec,
    ) -> Result<TodoPage, S::Error> {
        let matched = store
            .find_page(owner, &spec.predicate, &spec.order, spec.page.window())
            .await?;

        Ok(TodoPage {
            page_info: spec.page.info(matched.total),
            items: matched.items,
            total: matched.total,
            completed: matched.completed,
        })
    }

    /// Statistics over all of `owner`'s todos, ignoring any filter.
    pub async fn summarize<S: TodoStore>(
        &self,
        store: &S,
        owner: OwnerId,
        now: Timestamp,
    ) -> Result<TodoStats, S::Error> {
        store.todo_stats(owner, now).await
    }

    /// The `limit` most recently created todos of `owner`.
    pub async fn recent<S: TodoStore>(
        &self,
        store: &S,
        owner: OwnerId,
        limit: i64,
    ) -> Result<Vec<Todo>, S::Error> {
        store
            .find_todos(
                owner,
                &TodoPredicate::new(),
                &TodoOrder::newest_first(),
                PageWindow::first(limit),
            )
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTodoStore, MatchedPage};
    use crate::todo::Priority;
    use crate::types::DbId;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    const OWNER: OwnerId = 10;
    const OTHER_OWNER: OwnerId = 20;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn todo(id: DbId, owner: OwnerId, priority: Priority, completed: bool) -> Todo {
        Todo {
            id,
            owner_id: owner,
            title: format!("Todo number {id}"),
            description: String::new(),
            priority,
            category_id: None,
            due_date: None,
            completed,
            created_at: now() - Duration::hours(100 - id),
            updated_at: now(),
        }
    }

    /// A(High, open, due yesterday), B(Low, done), C(High, open, due tomorrow).
    fn scenario_store() -> InMemoryTodoStore {
        let mut a = todo(1, OWNER, Priority::High, false);
        a.due_date = Some(now() - Duration::days(1));
        let b = todo(2, OWNER, Priority::Low, true);
        let mut c = todo(3, OWNER, Priority::High, false);
        c.due_date = Some(now() + Duration::days(1));
        let foreign = todo(4, OTHER_OWNER, Priority::High, false);
        InMemoryTodoStore::new(vec![c, foreign, a, b])
    }

    fn filter(f: impl FnOnce(&mut RawTodoFilter)) -> RawTodoFilter {
        let mut raw = RawTodoFilter::default();
        f(&mut raw);
        raw
    }

    fn ids(todos: &[Todo]) -> Vec<DbId> {
        todos.iter().map(|t| t.id).collect()
    }

    /// Store where another writer completes every todo right after each read.
    struct ConcurrentlyCompletedStore {
        todos: Mutex<Vec<Todo>>,
        reads: AtomicUsize,
    }

    impl ConcurrentlyCompletedStore {
        fn new(todos: Vec<Todo>) -> Self {
            Self {
                todos: Mutex::new(todos),
                reads: AtomicUsize::new(0),
            }
        }

        /// Snapshot for one read; the write lands once the snapshot is taken.
        fn read(&self) -> InMemoryTodoStore {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let mut todos = self.todos.lock().unwrap();
            let snapshot = InMemoryTodoStore::new(todos.clone());
            for todo in todos.iter_mut() {
                todo.completed = true;
            }
            snapshot
        }
    }

    impl TodoStore for ConcurrentlyCompletedStore {
        type Error = Infallible;

        async fn find_todos(
            &self,
            owner: OwnerId,
            predicate: &TodoPredicate,
            order: &TodoOrder,
            window: PageWindow,
        ) -> Result<Vec<Todo>, Self::Error> {
            let snapshot = self.read();
            snapshot.find_todos(owner, predicate, order, window).await
        }

        async fn find_page(
            &self,
            owner: OwnerId,
            predicate: &TodoPredicate,
            order: &TodoOrder,
            window: PageWindow,
        ) -> Result<MatchedPage, Self::Error> {
            let snapshot = self.read();
            snapshot.find_page(owner, predicate, order, window).await
        }

        async fn todo_stats(&self, owner: OwnerId, now: Timestamp) -> Result<TodoStats, Self::Error> {
            let snapshot = self.read();
            snapshot.todo_stats(owner, now).await
        }

        async fn category_exists(&self, owner: OwnerId, category_id: DbId) -> Result<bool, Self::Error> {
            let snapshot = self.read();
            snapshot.category_exists(owner, category_id).await
        }
    }

    // -- query ----------------------------------------------------------------

    #[tokio::test]
    async fn priority_filter_returns_matching_todos_by_id() {
        let store = scenario_store();
        let engine = TodoQueryEngine::default();

        let page = engine
            .query(&store, OWNER, &filter(|f| f.priority = Some("high".into())))
            .await
            .unwrap();

        assert_eq!(ids(&page.items), vec![1, 3]);
        assert_eq!(page.total, 2);
        assert_eq!(page.page_info.total_pages, 1);
    }

    #[tokio::test]
    async fn query_is_scoped_to_owner() {
        let store = scenario_store();
        let page = TodoQueryEngine::default()
            .query(&store, OTHER_OWNER, &RawTodoFilter::default())
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![4]);
    }

    #[tokio::test]
    async fn bogus_sort_key_is_invalid_filter() {
        let store = scenario_store();
        let result = TodoQueryEngine::default()
            .query(&store, OWNER, &filter(|f| f.sort = Some("bogus".into())))
            .await;
        assert_matches!(result, Err(QueryError::InvalidFilter(e)) if e.field == "sort");
    }

    #[tokio::test]
    async fn unknown_category_is_invalid_filter() {
        let mut store = scenario_store();
        store.add_category(OTHER_OWNER, 77);

        let result = TodoQueryEngine::default()
            .query(&store, OWNER, &filter(|f| f.category = Some("77".into())))
            .await;
        assert_matches!(result, Err(QueryError::InvalidFilter(e)) if e.field == "category");
    }

    #[tokio::test]
    async fn total_is_independent_of_page() {
        let todos = (1..=23)
            .map(|id| todo(id, OWNER, Priority::ALL[(id % 4) as usize], id % 3 == 0))
            .collect();
        let store = InMemoryTodoStore::new(todos);
        let engine = TodoQueryEngine::default();
        let expected = 23 - 23 / 3;

        let mut seen = Vec::new();
        for page in 1..=4 {
            let result = engine
                .query(
                    &store,
                    OWNER,
                    &filter(|f| {
                        f.completed = Some("false".into());
                        f.page = Some(page.to_string());
                        f.page_size = Some("5".into());
                    }),
                )
                .await
                .unwrap();
            assert_eq!(result.total, expected);
            assert_eq!(result.page_info.total_pages, 4);
            seen.extend(ids(&result.items));
        }

        assert_eq!(seen.len() as i64, expected);
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(seen, sorted, "pages must be contiguous in id order");
    }

    #[tokio::test]
    async fn page_beyond_end_is_empty_not_error() {
        let store = scenario_store();
        let page = TodoQueryEngine::default()
            .query(&store, OWNER, &filter(|f| f.page = Some("7".into())))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page_info.total_pages, 1);
        assert!(!page.page_info.has_next);
        assert!(page.page_info.has_previous);
    }

    #[tokio::test]
    async fn repeated_query_is_idempotent() {
        let store = scenario_store();
        let engine = TodoQueryEngine::default();
        let raw = filter(|f| {
            f.sort = Some("-priority".into());
            f.page_size = Some("2".into());
        });

        let first = engine.query(&store, OWNER, &raw).await.unwrap();
        let second = engine.query(&store, OWNER, &raw).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first.items), vec![1, 3]);
    }

    #[tokio::test]
    async fn deleted_category_leaves_todos_uncategorized() {
        let mut store = InMemoryTodoStore::default();
        store.add_category(OWNER, 5);
        let mut t = todo(1, OWNER, Priority::Medium, false);
        t.category_id = Some(5);
        store.insert(t);

        assert!(store.delete_category(OWNER, 5));

        let engine = TodoQueryEngine::default();
        let page = engine
            .query(&store, OWNER, &filter(|f| f.category = Some("none".into())))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![1]);
        assert_eq!(page.items[0].category_id, None);

        let result = engine
            .query(&store, OWNER, &filter(|f| f.category = Some("5".into())))
            .await;
        assert_matches!(result, Err(QueryError::InvalidFilter(_)));
    }

    // -- summarize ------------------------------------------------------------

    #[tokio::test]
    async fn summarize_scenario() {
        let store = scenario_store();
        let stats = TodoQueryEngine::default()
            .summarize(&store, OWNER, now())
            .await
            .unwrap();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending_by_priority[&Priority::High], 2);
        assert_eq!(stats.pending_by_priority[&Priority::Low], 0);
    }

    #[tokio::test]
    async fn summarize_ignores_filters_and_matches_direct_computation() {
        let store = scenario_store();
        let stats = TodoQueryEngine::default()
            .summarize(&store, OWNER, now())
            .await
            .unwrap();
        let all = store
            .find_todos(OWNER, &TodoPredicate::new(), &TodoOrder::default(), PageWindow::first(100))
            .await
            .unwrap();

        assert_eq!(stats, TodoStats::from_todos(&all, now()));
        assert_eq!(stats.total, stats.completed + stats.pending);
    }

    #[tokio::test]
    async fn summarize_is_consistent_under_concurrent_writes() {
        let store = ConcurrentlyCompletedStore::new(vec![
            todo(1, OWNER, Priority::High, false),
            todo(2, OWNER, Priority::Low, false),
            todo(3, OWNER, Priority::Low, true),
        ]);

        let stats = TodoQueryEngine::default()
            .summarize(&store, OWNER, now())
            .await
            .unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.pending, stats.pending_by_priority.values().sum::<i64>());
    }

    #[tokio::test]
    async fn query_counts_match_items_under_concurrent_writes() {
        let store = ConcurrentlyCompletedStore::new(vec![
            todo(1, OWNER, Priority::High, false),
            todo(2, OWNER, Priority::Medium, false),
        ]);

        let page = TodoQueryEngine::default()
            .query(&store, OWNER, &filter(|f| f.completed = Some("false".into())))
            .await
            .unwrap();

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(ids(&page.items), vec![1, 2]);
        assert_eq!(page.total, 2);
        assert_eq!(page.completed, 0);
    }

    #[tokio::test]
    async fn page_reports_completed_count_of_whole_match() {
        let store = scenario_store();
        let page = TodoQueryEngine::default()
            .query(&store, OWNER, &filter(|f| f.page_size = Some("1".into())))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.completed, 1);
    }

    #[tokio::test]
    async fn summarize_empty_owner_is_all_zero() {
        let stats = TodoQueryEngine::default()
            .summarize(&InMemoryTodoStore::default(), OWNER, now())
            .await
            .unwrap();
        assert_eq!(stats, TodoStats::default());
    }

    // -- recent ---------------------------------------------------------------

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let store = scenario_store();
        let recent = TodoQueryEngine::default()
            .recent(&store, OWNER, 2)
            .await
            .unwrap();
        assert_eq!(ids(&recent), vec![3, 2]);
    }
}
