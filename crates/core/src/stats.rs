//! Dashboard statistics over an owner's whole todo collection.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::todo::{Priority, Todo};
use crate::types::Timestamp;

/// Aggregate counts shown on the dashboard.
///
/// `pending` is always `total - completed`. `pending_by_priority` has an
/// entry for every [`Priority`], zero included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub overdue: i64,
    pub pending_by_priority: BTreeMap<Priority, i64>,
}

impl Default for TodoStats {
    fn default() -> Self {
        Self {
            total: 0,
            completed: 0,
            pending: 0,
            overdue: 0,
            pending_by_priority: Priority::ALL.into_iter().map(|p| (p, 0)).collect(),
        }
    }
}

impl TodoStats {
    /// Compute statistics directly from a set of todos.
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>, now: Timestamp) -> Self {
        let mut stats = Self::default();
        for todo in todos {
            stats.total += 1;
            if todo.completed {
                stats.completed += 1;
            } else {
                *stats.pending_by_priority.entry(todo.priority).or_insert(0) += 1;
            }
            if todo.is_overdue(now) {
                stats.overdue += 1;
            }
        }
        stats.pending = stats.total - stats.completed;
        stats
    }

    /// Share of completed todos in percent, `0.0` for an empty collection.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}
