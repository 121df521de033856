//! Pagination of post listings
//!
//! Page numbers never cause an error. A missing or non-numeric page becomes
//! page 1, any out-of-range page (including zero and negatives) becomes the
//! last page, and an empty collection still has one empty page.

use serde::{Deserialize, Serialize};

/// Posts shown per listing page
pub const POSTS_PER_PAGE: i64 = 10;

/// A requested page number, before clamping against the collection size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest(i64);

impl PageRequest {
    /// Parse a raw `page` query value.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or_default()
    }

    pub fn number(self) -> i64 {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

impl From<i64> for PageRequest {
    fn from(n: i64) -> Self {
        Self(n)
    }
}

/// LIMIT/OFFSET window for a resolved page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

/// Page arithmetic over a collection of `total` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub total: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(total: i64, per_page: i64) -> Self {
        Self {
            total: total.max(0),
            per_page: per_page.max(1),
        }
    }

    /// Number of pages, at least one
    pub fn page_count(&self) -> i64 {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }

    /// Clamp a requested page into `1..=page_count`, mapping anything out of
    /// range to the last page.
    pub fn resolve(&self, request: PageRequest) -> i64 {
        let last = self.page_count();
        match request.number() {
            n if (1..=last).contains(&n) => n,
            _ => last,
        }
    }

    pub fn window(&self, page_number: i64) -> PageWindow {
        PageWindow {
            offset: (page_number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Current page number (1-indexed)
    pub page_number: i64,
    pub page_count: i64,
    /// Total number of items across all pages
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_number: i64, paginator: &Paginator) -> Self {
        let page_count = paginator.page_count();
        Self {
            items,
            page_number,
            page_count,
            total: paginator.total,
            has_next: page_number < page_count,
            has_previous: page_number > 1,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_count: self.page_count,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every request resolves to a page that exists.
        #[test]
        fn resolved_page_in_range(total in 0i64..10_000, requested in any::<i64>()) {
            let paginator = Paginator::new(total, POSTS_PER_PAGE);
            let page = paginator.resolve(requested.into());
            prop_assert!(page >= 1);
            prop_assert!(page <= paginator.page_count());
        }

        /// Pages cover the collection exactly once.
        #[test]
        fn windows_partition_the_collection(total in 0i64..500) {
            let paginator = Paginator::new(total, POSTS_PER_PAGE);
            let mut covered = 0;
            for page in 1..=paginator.page_count() {
                let window = paginator.window(page);
                prop_assert_eq!(window.offset, covered);
                covered += window.limit.min(total - window.offset).max(0);
            }
            prop_assert_eq!(covered, total);
        }

        /// Non-numeric input is page 1.
        #[test]
        fn non_numeric_is_first_page(raw in "[a-zA-Z_ ]{1,12}") {
            prop_assert_eq!(PageRequest::parse(Some(&raw)).number(), 1);
        }
    }
}
