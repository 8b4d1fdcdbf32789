//! Repository for the `todos` table.
//!
//! Every statement is scoped by `owner_id`; a todo of another owner behaves
//! exactly like a missing one.

use sqlx::PgPool;
use todo_core::filter::{like_pattern, CategoryFilter, TodoPredicate};
use todo_core::pagination::PageWindow;
use todo_core::sort::{SortKey, TodoOrder};
use todo_core::stats::TodoStats;
use todo_core::store::MatchedPage;
use todo_core::todo::{Priority, Todo};
use todo_core::types::{DbId, OwnerId, Timestamp};

use crate::models::todo::{CreateTodo, TodoRow, UpdateTodo};

/// Column list for `todos` queries.
const COLUMNS: &str = "\
    id, owner_id, title, description, priority, category_id, \
    due_date, completed, created_at, updated_at";

/// Provides owner-scoped CRUD and filtered listing for todos.
pub struct TodoRepo;

impl TodoRepo {
    /// List todos matching `predicate` in `order`, restricted to `window`.
    pub async fn find_matching(
        pool: &PgPool,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_todo_filter(owner, predicate);
        let query = page_query(&where_clause, order, bind_idx);
        tracing::debug!(owner, %query, "Querying todos");

        let rows = bind_todo_values(sqlx::query_as::<_, TodoRow>(&query), &bind_values)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// One window of matching todos plus the counts of the whole match.
    ///
    /// Counts and rows are read in a single `REPEATABLE READ` transaction so
    /// they see the same snapshot.
    pub async fn find_page(
        pool: &PgPool,
        owner: OwnerId,
        predicate: &TodoPredicate,
        order: &TodoOrder,
        window: PageWindow,
    ) -> Result<MatchedPage, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_todo_filter(owner, predicate);
        let count_query = format!(
            "SELECT COUNT(*)::BIGINT AS total, \
                    COUNT(*) FILTER (WHERE completed)::BIGINT AS completed \
             FROM todos {where_clause}"
        );
        let query = page_query(&where_clause, order, bind_idx);
        tracing::debug!(owner, %query, "Querying todo page");

        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let counts = bind_todo_values(sqlx::query_as::<_, MatchCounts>(&count_query), &bind_values)
            .fetch_one(&mut *tx)
            .await?;

        let items = if window.offset >= counts.total {
            Vec::new()
        } else {
            bind_todo_values(sqlx::query_as::<_, TodoRow>(&query), &bind_values)
                .bind(window.limit)
                .bind(window.offset)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(Todo::from)
                .collect()
        };

        tx.commit().await?;
        Ok(MatchedPage {
            items,
            total: counts.total,
            completed: counts.completed,
        })
    }

    /// Whole-collection statistics for `owner` in one aggregate statement.
    pub async fn stats(
        pool: &PgPool,
        owner: OwnerId,
        now: Timestamp,
    ) -> Result<TodoStats, sqlx::Error> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT
                COUNT(*)::BIGINT AS total,
                COUNT(*) FILTER (WHERE completed)::BIGINT AS completed,
                COUNT(*) FILTER (WHERE NOT completed AND due_date < $2)::BIGINT AS overdue,
                COUNT(*) FILTER (WHERE NOT completed AND priority = 'low')::BIGINT AS pending_low,
                COUNT(*) FILTER (WHERE NOT completed AND priority = 'medium')::BIGINT AS pending_medium,
                COUNT(*) FILTER (WHERE NOT completed AND priority = 'high')::BIGINT AS pending_high,
                COUNT(*) FILTER (WHERE NOT completed AND priority = 'urgent')::BIGINT AS pending_urgent
             FROM todos
             WHERE owner_id = $1",
        )
        .bind(owner)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// Find a todo by id.
    pub async fn find_by_id(
        pool: &PgPool,
        owner: OwnerId,
        id: DbId,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = $1 AND owner_id = $2");
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Todo::from))
    }

    /// Create a todo owned by `owner`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner: OwnerId,
        input: &CreateTodo,
    ) -> Result<Todo, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (owner_id, title, description, priority, category_id, due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(owner)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.priority.as_str())
            .bind(input.category_id)
            .bind(input.due_date)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Apply a partial update. `owner_id` is never written.
    pub async fn update(
        pool: &PgPool,
        owner: OwnerId,
        id: DbId,
        input: &UpdateTodo,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                priority = COALESCE($5, priority),
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END,
                due_date = CASE WHEN $8 THEN $9 ELSE due_date END,
                completed = COALESCE($10, completed)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .bind(owner)
            .bind(input.title.as_deref().map(str::trim))
            .bind(input.description.as_deref())
            .bind(input.priority.map(Priority::as_str))
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .bind(input.due_date.is_some())
            .bind(input.due_date.flatten())
            .bind(input.completed)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Todo::from))
    }

    /// Flip the completed flag, returning the updated row.
    pub async fn toggle(
        pool: &PgPool,
        owner: OwnerId,
        id: DbId,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET completed = NOT completed
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Todo::from))
    }

    /// Delete a todo. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, owner: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct MatchCounts {
    total: i64,
    completed: i64,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total: i64,
    completed: i64,
    overdue: i64,
    pending_low: i64,
    pending_medium: i64,
    pending_high: i64,
    pending_urgent: i64,
}

impl From<StatsRow> for TodoStats {
    fn from(row: StatsRow) -> Self {
        let mut stats = TodoStats {
            total: row.total,
            completed: row.completed,
            pending: row.total - row.completed,
            overdue: row.overdue,
            ..TodoStats::default()
        };
        for (priority, count) in [
            (Priority::Low, row.pending_low),
            (Priority::Medium, row.pending_medium),
            (Priority::High, row.pending_high),
            (Priority::Urgent, row.pending_urgent),
        ] {
            stats.pending_by_priority.insert(priority, count);
        }
        stats
    }
}

/// Typed bind value for dynamically-built todo queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from a [`TodoPredicate`].
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The clause always
/// starts with the owner condition, so it is never empty.
fn build_todo_filter(owner: OwnerId, predicate: &TodoPredicate) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = vec!["owner_id = $1".to_string()];
    let mut bind_idx = 2u32;
    let mut bind_values: Vec<BindValue> = vec![BindValue::BigInt(owner)];

    if let Some(priority) = predicate.priority {
        conditions.push(format!("priority = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(priority.as_str().to_string()));
    }

    match predicate.category {
        Some(CategoryFilter::Uncategorized) => {
            conditions.push("category_id IS NULL".to_string());
        }
        Some(CategoryFilter::Id(category_id)) => {
            conditions.push(format!("category_id = ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::BigInt(category_id));
        }
        None => {}
    }

    if let Some(completed) = predicate.completed {
        conditions.push(format!("completed = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Bool(completed));
    }

    if let Some(instant) = predicate.due_before {
        conditions.push(format!("due_date < ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(instant));
    }

    if let Some(ref search) = predicate.search {
        conditions.push(format!(
            "(title ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        bind_values.push(BindValue::Text(like_pattern(search)));
    }

    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    (where_clause, bind_values, bind_idx)
}

/// `SELECT` of one ordered window; limit and offset bind after the filter.
fn page_query(where_clause: &str, order: &TodoOrder, bind_idx: u32) -> String {
    format!(
        "SELECT {COLUMNS} FROM todos {where_clause} {} LIMIT ${bind_idx} OFFSET ${}",
        order_clause(order),
        bind_idx + 1
    )
}

/// Build the ORDER BY clause. Every order ends with `id ASC` so pages are
/// stable when the primary key has duplicates.
fn order_clause(order: &TodoOrder) -> String {
    let dir = order.direction.as_sql();
    match order.key {
        None => format!("ORDER BY id {dir}"),
        Some(SortKey::Created) => format!("ORDER BY created_at {dir}, id ASC"),
        Some(SortKey::DueDate) => format!("ORDER BY due_date {dir} NULLS LAST, id ASC"),
        Some(SortKey::Title) => format!("ORDER BY LOWER(title) COLLATE \"C\" {dir}, id ASC"),
        Some(SortKey::Priority) => {
            let ranks: String = Priority::ALL
                .iter()
                .map(|p| format!(" WHEN '{}' THEN {}", p.as_str(), p.rank()))
                .collect();
            format!("ORDER BY CASE priority{ranks} END {dir}, id ASC")
        }
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_todo_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
