//! Fixed-size, 1-indexed page windows.
//!
//! Out-of-range page numbers never fail: anything below the first page
//! resolves to the first page, anything past the last resolves to the last.
//! An empty sequence still has exactly one (empty) page.

use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

/// Posts shown per page on every listing.
pub const POSTS_PER_PAGE: u64 = 10;

/// A requested page number, as it came from the query string.
///
/// Not yet clamped; see [`PageWindow::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNumber(i64);

impl PageNumber {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw page number.
    #[must_use]
    pub const fn new(n: i64) -> Self {
        Self(n)
    }

    /// Parse a `?page=` value. Missing or non-numeric input means page 1.
    /// Numbers too large for `i64` saturate, so they still clamp to the
    /// nearest real page.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::FIRST;
        };
        match raw.trim().parse::<i64>() {
            Ok(n) => Self(n),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Self(i64::MAX),
                IntErrorKind::NegOverflow => Self(i64::MIN),
                _ => Self::FIRST,
            },
        }
    }

    /// The raw, unclamped value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// A resolved page: which rows to fetch for a given item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Clamped 1-indexed page number.
    pub number: u64,
    /// Total number of pages (at least 1).
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Rows to skip.
    pub offset: u64,
    /// Rows to take.
    pub limit: u64,
}

impl PageWindow {
    /// Resolve `page` against `total_items` split into `per_page` chunks.
    #[must_use]
    pub fn resolve(total_items: u64, page: PageNumber, per_page: u64) -> Self {
        let per_page = per_page.max(1);
        let num_pages = total_items.div_ceil(per_page).max(1);
        let requested = u64::try_from(page.get()).unwrap_or(1);
        let number = requested.clamp(1, num_pages);

        Self {
            number,
            num_pages,
            total_items,
            offset: (number - 1) * per_page,
            limit: per_page,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in order.
    pub items: Vec<T>,
    /// Clamped 1-indexed page number.
    pub number: u64,
    /// Total number of pages.
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Build a page from a resolved window and the rows fetched for it.
    #[must_use]
    pub fn from_window(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total_items: window.total_items,
            has_previous: window.number > 1,
            has_next: window.number < window.num_pages,
        }
    }

    /// Transform every item, keeping page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total_items: self.total_items,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }

    /// Replace the items, keeping page metadata.
    #[must_use]
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total_items: self.total_items,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice an already ordered sequence into the requested page of
/// [`POSTS_PER_PAGE`] items.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: PageNumber) -> Page<T> {
    paginate_by(items, page, POSTS_PER_PAGE)
}

/// Like [`paginate`] with an explicit page size.
#[must_use]
pub fn paginate_by<T>(items: Vec<T>, page: PageNumber, per_page: u64) -> Page<T> {
    let window = PageWindow::resolve(items.len() as u64, page, per_page);
    let slice = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Page::from_window(window, slice)
}
