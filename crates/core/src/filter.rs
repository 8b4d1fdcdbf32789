//! Filter stage of the todo query pipeline.
//!
//! [`RawTodoFilter`] is the untrusted query-string form. [`FilterSpec::parse`]
//! validates it into a [`TodoPredicate`] (the conjunctive filter handed to a
//! store in one call), a [`TodoOrder`] and a [`PageRequest`].

use serde::Deserialize;

use crate::error::InvalidFilterError;
use crate::pagination::{PageRequest, QueryLimits};
use crate::sort::TodoOrder;
use crate::todo::{Priority, Todo};
use crate::types::{DbId, Timestamp};

/// Query-string value that selects todos without a category.
pub const CATEGORY_NONE: &str = "none";

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Filter, sort, and page parameters exactly as received.
///
/// Every field is a string so malformed values surface as
/// [`InvalidFilterError`] instead of a deserializer rejection. Unknown keys
/// are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTodoFilter {
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Treat missing, empty, and whitespace-only values alike.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Category condition of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Todos whose category reference is null.
    Uncategorized,
    /// Todos in exactly this category.
    Id(DbId),
}

/// Conjunction of optional conditions over one owner's todos.
///
/// Built field by field, then passed whole to a
/// [`TodoStore`](crate::store::TodoStore). An empty predicate matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPredicate {
    pub priority: Option<Priority>,
    pub category: Option<CategoryFilter>,
    pub completed: Option<bool>,
    /// Case-insensitive substring of title OR description.
    pub search: Option<String>,
    /// Strictly before this instant; todos without a due date never match.
    pub due_before: Option<Timestamp>,
}

impl TodoPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_due_before(mut self, instant: Timestamp) -> Self {
        self.due_before = Some(instant);
        self
    }

    /// Evaluate the predicate against a single todo.
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(priority) = self.priority {
            if todo.priority != priority {
                return false;
            }
        }

        match self.category {
            Some(CategoryFilter::Uncategorized) if todo.category_id.is_some() => return false,
            Some(CategoryFilter::Id(id)) if todo.category_id != Some(id) => return false,
            _ => {}
        }

        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }

        if let Some(instant) = self.due_before {
            match todo.due_date {
                Some(due) if due < instant => {}
                _ => return false,
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let in_title = todo.title.to_lowercase().contains(&needle);
            let in_description = todo.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }

        true
    }
}

/// Escape `%`, `_` and `\` and wrap in `%...%` for a literal `ILIKE` match.
///
/// # Examples
///
/// ```
/// use todo_core::filter::like_pattern;
/// assert_eq!(like_pattern("50%"), "%50\\%%");
/// assert_eq!(like_pattern("a_b"), "%a\\_b%");
/// ```
pub fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// ---------------------------------------------------------------------------
// Validated query
// ---------------------------------------------------------------------------

/// A validated, normalized todo query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub predicate: TodoPredicate,
    pub order: TodoOrder,
    pub page: PageRequest,
}

impl FilterSpec {
    /// Validate every recognised parameter of `raw`.
    ///
    /// Category ids are only checked for syntax here; ownership is verified
    /// against the store by the engine.
    pub fn parse(raw: &RawTodoFilter, limits: &QueryLimits) -> Result<Self, InvalidFilterError> {
        let mut predicate = TodoPredicate::new();

        if let Some(value) = non_blank(raw.priority.as_deref()) {
            predicate = predicate.with_priority(value.parse()?);
        }
        if let Some(value) = non_blank(raw.category.as_deref()) {
            predicate = predicate.with_category(parse_category(value)?);
        }
        if let Some(value) = non_blank(raw.completed.as_deref()) {
            predicate = predicate.with_completed(parse_completed(value)?);
        }
        if let Some(value) = non_blank(raw.search.as_deref()) {
            predicate = predicate.with_search(value);
        }

        let order = TodoOrder::parse(raw.sort.as_deref(), raw.direction.as_deref())?;
        let page = PageRequest::parse(raw.page.as_deref(), raw.page_size.as_deref(), limits)?;

        Ok(Self {
            predicate,
            order,
            page,
        })
    }
}

fn parse_category(value: &str) -> Result<CategoryFilter, InvalidFilterError> {
    if value.eq_ignore_ascii_case(CATEGORY_NONE) {
        return Ok(CategoryFilter::Uncategorized);
    }
    match value.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(CategoryFilter::Id(id)),
        _ => Err(InvalidFilterError::new(
            "category",
            format!("expected a category id or '{CATEGORY_NONE}', got '{value}'"),
        )),
    }
}

fn parse_completed(value: &str) -> Result<bool, InvalidFilterError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(InvalidFilterError::new(
            "completed",
            format!("expected 'true' or 'false', got '{value}'"),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, SortKey};
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn todo(title: &str, description: &str) -> Todo {
        Todo {
            id: 1,
            owner_id: 1,
            title: title.to_string(),
            description: description.to_string(),
            priority: Priority::High,
            category_id: Some(4),
            due_date: Some(now() - Duration::days(1)),
            completed: false,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn raw() -> RawTodoFilter {
        RawTodoFilter::default()
    }

    // -- Predicate ------------------------------------------------------------

    #[test]
    fn empty_predicate_matches_everything() {
        assert!(TodoPredicate::new().matches(&todo("Buy milk", "")));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let t = todo("Buy milk", "");
        let predicate = TodoPredicate::new()
            .with_priority(Priority::High)
            .with_completed(true);
        assert!(!predicate.matches(&t));

        let predicate = TodoPredicate::new()
            .with_priority(Priority::High)
            .with_completed(false)
            .with_category(CategoryFilter::Id(4));
        assert!(predicate.matches(&t));
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let t = todo("Quarterly REPORT", "send to finance");
        assert!(TodoPredicate::new().with_search("report").matches(&t));
        assert!(TodoPredicate::new().with_search("FINANCE").matches(&t));
        assert!(!TodoPredicate::new().with_search("marketing").matches(&t));
    }

    #[test]
    fn uncategorized_matches_only_null_category() {
        let mut t = todo("Buy milk", "");
        let predicate = TodoPredicate::new().with_category(CategoryFilter::Uncategorized);
        assert!(!predicate.matches(&t));
        t.category_id = None;
        assert!(predicate.matches(&t));
    }

    #[test]
    fn due_before_requires_due_date() {
        let mut t = todo("Buy milk", "");
        let predicate = TodoPredicate::new().with_completed(false).with_due_before(now());
        assert!(predicate.matches(&t));
        t.due_date = None;
        assert!(!predicate.matches(&t));
    }

    // -- like_pattern ---------------------------------------------------------

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("milk"), "%milk%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    // -- FilterSpec::parse ----------------------------------------------------

    #[test]
    fn empty_raw_filter_uses_defaults() {
        let spec = FilterSpec::parse(&raw(), &QueryLimits::default()).unwrap();
        assert_eq!(spec.predicate, TodoPredicate::new());
        assert_eq!(spec.order, TodoOrder::default());
        assert_eq!(spec.page.number, 1);
        assert_eq!(spec.page.size, 10);
    }

    #[test]
    fn blank_values_are_ignored() {
        let filter = RawTodoFilter {
            priority: Some(String::new()),
            completed: Some("  ".into()),
            search: Some(" ".into()),
            ..raw()
        };
        let spec = FilterSpec::parse(&filter, &QueryLimits::default()).unwrap();
        assert_eq!(spec.predicate, TodoPredicate::new());
    }

    #[test]
    fn all_filters_are_parsed() {
        let filter = RawTodoFilter {
            priority: Some("High".into()),
            category: Some("none".into()),
            completed: Some("false".into()),
            search: Some("  milk ".into()),
            sort: Some("-due_date".into()),
            page: Some("2".into()),
            page_size: Some("5".into()),
            ..raw()
        };
        let spec = FilterSpec::parse(&filter, &QueryLimits::default()).unwrap();
        assert_eq!(
            spec.predicate,
            TodoPredicate::new()
                .with_priority(Priority::High)
                .with_category(CategoryFilter::Uncategorized)
                .with_completed(false)
                .with_search("milk")
        );
        assert_eq!(spec.order.key, Some(SortKey::DueDate));
        assert_eq!(spec.order.direction, SortDirection::Desc);
        assert_eq!((spec.page.number, spec.page.size), (2, 5));
    }

    #[test]
    fn invalid_priority_is_rejected() {
        let filter = RawTodoFilter {
            priority: Some("critical".into()),
            ..raw()
        };
        assert_matches!(
            FilterSpec::parse(&filter, &QueryLimits::default()),
            Err(InvalidFilterError { field: "priority", .. })
        );
    }

    #[test]
    fn invalid_category_is_rejected() {
        for bad in ["abc", "0", "-3", "1.5"] {
            let filter = RawTodoFilter {
                category: Some(bad.into()),
                ..raw()
            };
            assert_matches!(
                FilterSpec::parse(&filter, &QueryLimits::default()),
                Err(InvalidFilterError { field: "category", .. }),
                "category {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_completed_is_rejected() {
        let filter = RawTodoFilter {
            completed: Some("maybe".into()),
            ..raw()
        };
        assert_matches!(
            FilterSpec::parse(&filter, &QueryLimits::default()),
            Err(InvalidFilterError { field: "completed", .. })
        );
    }

    #[test]
    fn bogus_sort_key_is_rejected() {
        let filter = RawTodoFilter {
            sort: Some("bogus".into()),
            ..raw()
        };
        assert_matches!(
            FilterSpec::parse(&filter, &QueryLimits::default()),
            Err(InvalidFilterError { field: "sort", .. })
        );
    }
}
