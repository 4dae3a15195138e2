//! Page-number pagination.
//!
//! Pages are 1-based. Page `p` of size `n` covers the half-open window
//! `[(p - 1) * n, (p - 1) * n + n)` of the full ordered collection, clipped
//! to its bounds.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    /// Page number below 1.
    #[error("page must be at least 1 (got {0})")]
    InvalidPage(i64),
    /// Page size below 1.
    #[error("page size must be at least 1 (got {0})")]
    InvalidPageSize(i64),
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a raw page request.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` or `page_size` is zero or negative.
    /// Values above `u32::MAX` are clamped.
    pub fn new(page: i64, page_size: i64) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::InvalidPage(page));
        }
        if page_size < 1 {
            return Err(PageRequestError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            page_size: u32::try_from(page_size).unwrap_or(u32::MAX),
        })
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.page_size as usize
    }

    /// Number of items this page holds when the collection has `total` items.
    #[must_use]
    pub fn expected_len(&self, total: usize) -> usize {
        total.saturating_sub(self.offset()).min(self.limit())
    }
}

/// One page of results plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Assemble a page for `request`.
    #[must_use]
    pub fn new(data: Vec<T>, total: usize, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_values() {
        assert_eq!(PageRequest::new(0, 10), Err(PageRequestError::InvalidPage(0)));
        assert_eq!(
            PageRequest::new(1, -5),
            Err(PageRequestError::InvalidPageSize(-5))
        );
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(3, 10).unwrap().offset(), 20);
    }

    #[test]
    fn test_expected_len_matches_window() {
        // 25 items: 10, 10, 5, then empty pages.
        let total = 25;
        for (page, expected) in [(1, 10), (2, 10), (3, 5), (4, 0), (100, 0)] {
            let request = PageRequest::new(page, 10).unwrap();
            assert_eq!(request.expected_len(total), expected, "page {page}");
        }
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let request = PageRequest::new(i64::MAX, i64::MAX).unwrap();
        assert_eq!(request.expected_len(10), 0);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(2, 2).unwrap());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["total"], 12);
    }
}
