//! Paginated list envelope.

use serde::{Deserialize, Serialize};

/// Default page requested when the caller does not specify one.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size requested when the caller does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// One page of results plus the pagination parameters the service applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Results in the order the service returned them.
    pub results: Vec<T>,
    /// Total number of results across all pages.
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Number of pages needed to hold `total` results.
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }

    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }

    /// Whether a page before this one exists.
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
