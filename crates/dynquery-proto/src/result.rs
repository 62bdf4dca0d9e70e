//! Paged response envelope.

use serde::{Deserialize, Serialize};

use crate::query::PageRequest;

/// One page of a list/search response.
///
/// `total_items` counts every match before paging was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// Items on this page, in result order.
    pub items: Vec<T>,
    /// Number of matching items across all pages.
    pub total_items: usize,
    /// 1-based page number.
    pub page_index: u32,
    /// Requested page size.
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    /// Create a page.
    pub fn new(items: Vec<T>, total_items: usize, page: PageRequest) -> Self {
        Self {
            items,
            total_items,
            page_index: page.page_index,
            page_size: page.page_size,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if this page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages needed to hold `total_items`.
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.page_size as usize)
    }

    /// Whether a later page holds more items.
    pub fn has_next_page(&self) -> bool {
        (self.page_index as usize) < self.total_pages()
    }

    /// Transform the items, keeping the paging metadata.
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}
