//! Todo domain types and read-time derived properties.
//!
//! `overdue` and `days_until_due` are never stored; they are computed from
//! the persisted fields against a caller-supplied clock.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidFilterError;
use crate::types::{DbId, OwnerId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum todo title length in characters.
pub const MIN_TITLE_LEN: usize = 3;

/// Maximum todo title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

const SECONDS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Todo priority level. Declaration order is the sort rank.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Every priority, lowest first.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Storage / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Numeric rank used for ordering (1 = low).
    pub fn rank(self) -> i16 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Urgent => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = InvalidFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                InvalidFilterError::new(
                    "priority",
                    format!("unknown priority '{trimmed}'. Valid values: low, medium, high, urgent"),
                )
            })
    }
}

impl TryFrom<String> for Priority {
    type Error = InvalidFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Todo
// ---------------------------------------------------------------------------

/// A single todo item as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Todo {
    /// Due date has passed and the todo is still open.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        match self.due_date {
            Some(due) => !self.completed && due < now,
            None => false,
        }
    }

    /// Whole days until the due date, floored (negative once it has passed).
    pub fn days_until_due(&self, now: Timestamp) -> Option<i64> {
        self.due_date
            .map(|due| (due - now).num_seconds().div_euclid(SECONDS_PER_DAY))
    }

    /// Snapshot of this todo with its derived fields evaluated at `now`.
    pub fn view(self, now: Timestamp) -> TodoView {
        TodoView {
            is_overdue: self.is_overdue(now),
            days_until_due: self.days_until_due(now),
            todo: self,
        }
    }
}

/// A todo plus its read-time derived fields, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TodoView {
    #[serde(flatten)]
    pub todo: Todo,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
}

/// Validate a todo title (trimmed length between the min and max bounds).
pub fn validate_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if len < MIN_TITLE_LEN {
        return Err(format!(
            "Title must be at least {MIN_TITLE_LEN} characters"
        ));
    }
    if len > MAX_TITLE_LEN {
        return Err(format!("Title must be at most {MAX_TITLE_LEN} characters"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
