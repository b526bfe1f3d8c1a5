//! Page types - one page of a paginated listing and the request for it.

use serde::{Deserialize, Serialize};

/// Request for one page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Resource path relative to the site root (e.g. `studio/a24/`)
    pub path: String,

    /// 1-based page index
    pub page: u32,

    /// Encoded film filter (sent by the session as the `filmFilter` cookie)
    #[serde(default)]
    pub filters: Option<String>,
}

impl PageRequest {
    pub fn new(path: impl Into<String>, page: u32) -> Self {
        Self {
            path: path.into(),
            page,
            filters: None,
        }
    }

    /// Set the encoded filter string.
    pub fn with_filters(mut self, filters: Option<String>) -> Self {
        self.filters = filters.filter(|f| !f.is_empty());
        self
    }

    /// Path of this page as the site addresses it.
    pub fn page_path(&self) -> String {
        let base = self.path.trim_end_matches('/');
        if self.page <= 1 {
            format!("{}/", base)
        } else {
            format!("{}/page/{}/", base, self.page)
        }
    }
}

/// Records from one page plus whatever pagination metadata the page carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Records in page order
    pub records: Vec<T>,

    /// 1-based index of this page
    pub page_index: u32,

    /// Total items across all pages, when the page reports it
    pub total_count: Option<u64>,

    /// Total pages, when the page shows a paginator
    pub total_pages: Option<u32>,
}

impl<T> PageResult<T> {
    pub fn new(page_index: u32, records: Vec<T>) -> Self {
        Self {
            records,
            page_index,
            total_count: None,
            total_pages: None,
        }
    }

    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }

    pub fn with_total_pages(mut self, pages: u32) -> Self {
        self.total_pages = Some(pages);
        self
    }

    /// Resolve the page count.
    ///
    /// An explicit page count wins; otherwise the item count is divided by
    /// `page_size`. A page with neither (no paginator shown) is the only page.
    pub fn resolved_total_pages(&self, page_size: Option<u32>) -> u32 {
        if let Some(pages) = self.total_pages {
            return pages;
        }
        match (self.total_count, page_size) {
            (Some(count), Some(size)) if size > 0 => {
                u32::try_from(count.div_ceil(u64::from(size))).unwrap_or(u32::MAX)
            }
            _ => 1,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
