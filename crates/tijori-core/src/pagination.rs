//! # Pagination
//!
//! Page math shared by every entity list.
//!
//! ```text
//!  total = 23, per_page = 10
//!
//!  page 1  offset  0  rows 1..10
//!  page 2  offset 10  rows 11..20
//!  page 3  offset 20  rows 21..23
//!  page 4  offset 30  (empty, not an error)
//!  page 0  ─────────  (empty, not an error)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    /// Requested page. Values below 1 are accepted and yield an empty page.
    pub page: i64,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request, clamping `per_page` into `1..=MAX_PAGE_SIZE`.
    pub fn new(page: i64, per_page: u32) -> Self {
        PageRequest {
            page,
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset for this page, or `None` when the page is below 1.
    pub fn offset(&self) -> Option<i64> {
        if self.page < 1 {
            return None;
        }
        (self.page - 1).checked_mul(i64::from(self.per_page))
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// `ceil(total / per_page)`, never less than 1.
///
/// ```rust
/// use tijori_core::pagination::total_pages;
///
/// assert_eq!(total_pages(0, 10), 1);
/// assert_eq!(total_pages(23, 10), 3);
/// ```
pub fn total_pages(total: i64, per_page: u32) -> i64 {
    let per_page = i64::from(per_page.max(1));
    let total = total.max(0);
    ((total + per_page - 1) / per_page).max(1)
}

/// One page of a filtered list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the filter across all pages.
    pub total: i64,
    pub page: i64,
    pub per_page: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Page {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total_pages(total, request.per_page),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Page::new(Vec::new(), 0, request)
    }

    pub fn has_next(&self) -> bool {
        self.page >= 1 && self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Search endpoint envelope: `{"results": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResults<T> {
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for SearchResults<T> {
    fn from(results: Vec<T>) -> Self {
        SearchResults { results }
    }
}
