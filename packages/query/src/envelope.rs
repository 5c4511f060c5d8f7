//! Pagination parameters and the paginated result envelope.

use serde::Serialize;

use crate::QueryError;

/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Validates a page request.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] if `page` or `page_size` is
    /// zero, or if the resulting offset does not fit the store's range.
    pub fn new(page: u32, page_size: u32) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidParameter { name: "page" });
        }
        if page_size == 0 {
            return Err(QueryError::InvalidParameter { name: "pageSize" });
        }

        let pagination = Self { page, page_size };
        if u32::try_from(pagination.offset()).is_err() {
            return Err(QueryError::InvalidParameter { name: "page" });
        }

        Ok(pagination)
    }

    /// Builds a page request from optional parameters, applying defaults.
    ///
    /// # Errors
    ///
    /// See [`Pagination::new`].
    pub fn from_optional(page: Option<u32>, page_size: Option<u32>) -> Result<Self, QueryError> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items before this page: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// The items of `all` that fall on this page.
    #[must_use]
    pub fn slice<T>(&self, all: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);

        all.into_iter()
            .skip(offset)
            .take(self.page_size as usize)
            .collect()
    }
}

/// `ceil(total_count / page_size)`, or `0` when there is nothing to show.
#[must_use]
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

/// A page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages available.
    pub total_pages: u64,
    /// Number of results across all pages.
    pub total_results: u64,
    /// Results on this page.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Wraps `items` with metadata derived from `total_count`.
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u64, pagination: Pagination) -> Self {
        Self {
            page: pagination.page(),
            page_size: pagination.page_size(),
            total_pages: total_pages(total_count, pagination.page_size()),
            total_results: total_count,
            items,
        }
    }

    /// A page with no results and zero totals.
    #[must_use]
    pub fn empty(pagination: Pagination) -> Self {
        Self::new(Vec::new(), 0, pagination)
    }

    /// Converts every item, keeping the metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_results: self.total_results,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
