//! Pagination stage of the todo query pipeline.
//!
//! Pages are 1-indexed at the boundary and converted to a zero-based
//! [`PageWindow`] (offset/limit) for the store.

use serde::Serialize;

use crate::error::InvalidFilterError;
use crate::filter::non_blank;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default number of todos per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Default upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of todos listed in the dashboard's "recent" panel.
pub const RECENT_TODOS_LIMIT: i64 = 5;

/// Page size bounds, normally loaded from server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / window
// ---------------------------------------------------------------------------

/// Validated 1-indexed page request. `size` is already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    /// Parse `page` and `page_size`.
    ///
    /// Both must be positive base-10 integers when present. A missing size
    /// uses the configured default; an oversized one is clamped to the max.
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        limits: &QueryLimits,
    ) -> Result<Self, InvalidFilterError> {
        let number = match non_blank(page) {
            Some(value) => parse_positive("page", value)?,
            None => 1,
        };
        let size = match non_blank(page_size) {
            Some(value) => parse_positive("page_size", value)?,
            None => limits.default_page_size,
        };
        Ok(Self {
            number,
            size: size.min(limits.max_page_size).max(1),
        })
    }

    /// Zero-based row window for this page.
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.number - 1).saturating_mul(self.size),
            limit: self.size,
        }
    }

    /// Page metadata for `total` matching rows.
    pub fn info(&self, total: i64) -> PageInfo {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + self.size - 1) / self.size
        };
        PageInfo {
            page: self.number,
            page_size: self.size,
            total_pages,
            has_next: self.number < total_pages,
            has_previous: self.number > 1,
        }
    }
}

fn parse_positive(field: &'static str, value: &str) -> Result<i64, InvalidFilterError> {
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(n) => Err(InvalidFilterError::new(
            field,
            format!("must be a positive integer, got {n}"),
        )),
        Err(_) => Err(InvalidFilterError::new(
            field,
            format!("must be a positive integer, got '{value}'"),
        )),
    }
}

/// Offset/limit slice handed to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

impl PageWindow {
    /// The first `limit` rows.
    pub fn first(limit: i64) -> Self {
        Self { offset: 0, limit }
    }
}

/// Derived page metadata returned alongside the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}
