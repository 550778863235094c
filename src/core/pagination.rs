//! Page arithmetic and the page request/response shapes exchanged with server-side sources.

use crate::core::filters::ListFilter;
use serde::{Deserialize, Serialize};

/// Number of pages needed for `count` items, never less than one.
///
/// An empty result still has one (empty) page so pagination controls never show `0 of 0`.
pub const fn total_pages(count: u64, page_size: u64) -> u64 {
    let size = if page_size == 0 { 1 } else { page_size };
    let pages = count.div_ceil(size);
    if pages == 0 { 1 } else { pages }
}

/// Returns the slice of `items` that makes up 1-indexed `page`.
///
/// Pages past the end yield an empty slice.
pub fn page_slice<T>(items: &[T], page: u64, page_size: u64) -> &[T] {
    let size = usize::try_from(page_size.max(1)).unwrap_or(usize::MAX);
    let index = usize::try_from(page.max(1) - 1).unwrap_or(usize::MAX);
    let start = index.saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Sort direction forwarded as `sortOrder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Column ordering requested from a server-side source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field name as the backend knows it (e.g. `"createdAt"`)
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Everything a server-side source needs to produce one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery<F> {
    /// Trimmed free-text search, `None` when blank
    pub search: Option<String>,
    pub filters: F,
    /// 1-indexed page number
    pub page: u64,
    pub page_size: u64,
    pub sort: Option<Sort>,
}

impl<F: ListFilter> PageQuery<F> {
    /// Renders the query as request parameters.
    ///
    /// Filter dimensions set to "all" are left out entirely.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        params.extend(
            self.filters
                .params()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value)),
        );
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("pageSize".to_string(), self.page_size.to_string()));
        if let Some(sort) = &self.sort {
            params.push(("sortBy".to_string(), sort.field.clone()));
            params.push(("sortOrder".to_string(), sort.order.as_str().to_string()));
        }
        params
    }

    /// Zero-based row offset of the first item on the page.
    pub const fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)).saturating_mul(self.page_size)
    }
}

/// One page as returned by a server-side source, already filtered and paginated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}
