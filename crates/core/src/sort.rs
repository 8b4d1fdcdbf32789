//! Sort stage of the todo query pipeline.
//!
//! One primary key plus a fixed tie-break on id ascending, so every order is
//! total and page boundaries are stable.

use std::cmp::Ordering;

use crate::error::InvalidFilterError;
use crate::filter::non_blank;
use crate::todo::Todo;

/// Sortable todo fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Created,
    DueDate,
    Title,
    Priority,
}

impl SortKey {
    pub const VALID: &'static [&'static str] = &["created", "due_date", "title", "priority"];

    fn parse(value: &str) -> Result<Self, InvalidFilterError> {
        match value.to_ascii_lowercase().as_str() {
            "created" | "created_at" => Ok(SortKey::Created),
            "due_date" => Ok(SortKey::DueDate),
            "title" => Ok(SortKey::Title),
            "priority" => Ok(SortKey::Priority),
            _ => Err(InvalidFilterError::new(
                "sort",
                format!(
                    "unknown sort key '{value}'. Valid keys: {}",
                    Self::VALID.join(", ")
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(value: &str) -> Result<Self, InvalidFilterError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(InvalidFilterError::new(
                "direction",
                format!("unknown sort direction '{value}'. Valid values: asc, desc"),
            )),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Requested ordering. `key == None` orders by id only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoOrder {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl TodoOrder {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Newest first, as shown on the dashboard.
    pub fn newest_first() -> Self {
        Self::new(SortKey::Created, SortDirection::Desc)
    }

    /// Parse the `sort` and `direction` query parameters.
    ///
    /// A `-` prefix on `sort` means descending; an explicit `direction`
    /// takes precedence over the prefix.
    pub fn parse(sort: Option<&str>, direction: Option<&str>) -> Result<Self, InvalidFilterError> {
        let explicit = non_blank(direction).map(SortDirection::parse).transpose()?;

        let Some(sort) = non_blank(sort) else {
            return Ok(Self {
                key: None,
                direction: explicit.unwrap_or_default(),
            });
        };

        let (name, prefixed) = match sort.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (sort, SortDirection::Asc),
        };

        Ok(Self {
            key: Some(SortKey::parse(name)?),
            direction: explicit.unwrap_or(prefixed),
        })
    }

    /// Total order over todos: primary key in the requested direction, then
    /// id ascending.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let primary = match self.key {
            None => self.direction.apply(a.id.cmp(&b.id)),
            Some(SortKey::Created) => self.direction.apply(a.created_at.cmp(&b.created_at)),
            Some(SortKey::Title) => self
                .direction
                .apply(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            Some(SortKey::Priority) => self.direction.apply(a.priority.cmp(&b.priority)),
            // Missing due dates go last in both directions.
            Some(SortKey::DueDate) => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort `todos` in place.
    pub fn sort(&self, todos: &mut [Todo]) {
        todos.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::Priority;
    use crate::types::Timestamp;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn base() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn todo(id: i64, title: &str, priority: Priority, due_in_days: Option<i64>) -> Todo {
        Todo {
            id,
            owner_id: 1,
            title: title.to_string(),
            description: String::new(),
            priority,
            category_id: None,
            due_date: due_in_days.map(|d| base() + Duration::days(d)),
            completed: false,
            created_at: base() + Duration::minutes(id),
            updated_at: base(),
        }
    }

    fn ids(todos: &[Todo]) -> Vec<i64> {
        todos.iter().map(|t| t.id).collect()
    }

    // -- Parsing --------------------------------------------------------------

    #[test]
    fn no_sort_orders_by_id() {
        assert_eq!(TodoOrder::parse(None, None).unwrap(), TodoOrder::default());
        assert_eq!(TodoOrder::parse(Some(""), None).unwrap().key, None);
    }

    #[test]
    fn dash_prefix_means_descending() {
        let order = TodoOrder::parse(Some("-created_at"), None).unwrap();
        assert_eq!(order, TodoOrder::newest_first());
    }

    #[test]
    fn explicit_direction_overrides_prefix() {
        let order = TodoOrder::parse(Some("-title"), Some("asc")).unwrap();
        assert_eq!(order, TodoOrder::new(SortKey::Title, SortDirection::Asc));
    }

    #[test]
    fn unknown_key_and_direction_are_rejected() {
        assert_matches!(
            TodoOrder::parse(Some("bogus"), None),
            Err(InvalidFilterError { field: "sort", .. })
        );
        assert_matches!(
            TodoOrder::parse(Some("title"), Some("sideways")),
            Err(InvalidFilterError { field: "direction", .. })
        );
    }

    // -- Ordering -------------------------------------------------------------

    #[test]
    fn priority_sorts_by_rank_with_id_tie_break() {
        let mut todos = vec![
            todo(3, "c", Priority::High, None),
            todo(1, "a", Priority::Urgent, None),
            todo(2, "b", Priority::High, None),
            todo(4, "d", Priority::Low, None),
        ];
        TodoOrder::new(SortKey::Priority, SortDirection::Asc).sort(&mut todos);
        assert_eq!(ids(&todos), vec![4, 2, 3, 1]);

        TodoOrder::new(SortKey::Priority, SortDirection::Desc).sort(&mut todos);
        assert_eq!(ids(&todos), vec![1, 2, 3, 4]);
    }

    #[test]
    fn due_date_puts_missing_dates_last_in_both_directions() {
        let mut todos = vec![
            todo(1, "a", Priority::Low, None),
            todo(2, "b", Priority::Low, Some(5)),
            todo(3, "c", Priority::Low, Some(1)),
            todo(4, "d", Priority::Low, None),
        ];
        TodoOrder::new(SortKey::DueDate, SortDirection::Asc).sort(&mut todos);
        assert_eq!(ids(&todos), vec![3, 2, 1, 4]);

        TodoOrder::new(SortKey::DueDate, SortDirection::Desc).sort(&mut todos);
        assert_eq!(ids(&todos), vec![2, 3, 1, 4]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let mut todos = vec![
            todo(1, "banana", Priority::Low, None),
            todo(2, "Apple", Priority::Low, None),
            todo(3, "cherry", Priority::Low, None),
        ];
        TodoOrder::new(SortKey::Title, SortDirection::Asc).sort(&mut todos);
        assert_eq!(ids(&todos), vec![2, 1, 3]);
    }

    #[test]
    fn sorting_duplicates_twice_gives_same_order() {
        let make = || {
            vec![
                todo(5, "same", Priority::Medium, Some(2)),
                todo(2, "same", Priority::Medium, Some(2)),
                todo(9, "same", Priority::Medium, Some(2)),
                todo(1, "same", Priority::Medium, Some(2)),
            ]
        };
        for key in [SortKey::Title, SortKey::Priority, SortKey::DueDate] {
            let order = TodoOrder::new(key, SortDirection::Desc);
            let mut first = make();
            let mut second = make();
            second.reverse();
            order.sort(&mut first);
            order.sort(&mut second);
            assert_eq!(ids(&first), vec![1, 2, 5, 9]);
            assert_eq!(ids(&first), ids(&second));
        }
    }
}
