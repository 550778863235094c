//! State shared by both list controller flavours.
//!
//! [`ListState`] owns the filter record, the search text, the current page and the page size.
//! Every mutator that narrows or widens the result set sends the list back to page 1; staying
//! on page 7 of a result set that now has 2 pages would show nothing.

use crate::core::filters::{ListFilter, matches_search};
use crate::core::pagination::{page_slice, total_pages};

/// Text shown in place of table rows when a list has nothing to show.
pub const NO_RECORDS: &str = "No records found";

/// Filter, search and paging state of one list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<F> {
    filters: F,
    search_query: String,
    current_page: u64,
    page_size: u64,
}

impl<F: ListFilter> ListState<F> {
    /// Creates a state on page 1 with every filter set to "all".
    ///
    /// A page size of zero is raised to one.
    pub fn new(page_size: u64) -> Self {
        Self {
            filters: F::default(),
            search_query: String::new(),
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub const fn filters(&self) -> &F {
        &self.filters
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub const fn current_page(&self) -> u64 {
        self.current_page
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Changes one or more filter dimensions and returns to page 1.
    pub fn set_filter(&mut self, update: impl FnOnce(&mut F)) {
        update(&mut self.filters);
        self.current_page = 1;
    }

    /// Replaces the whole filter record and returns to page 1.
    pub fn replace_filters(&mut self, filters: F) {
        self.filters = filters;
        self.current_page = 1;
    }

    /// Changes the search text and returns to page 1.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
        self.current_page = 1;
    }

    /// Moves to `page`; anything below 1 becomes 1.
    pub fn set_page(&mut self, page: u64) {
        self.current_page = page.max(1);
    }

    /// Search text as it should be forwarded, `None` when blank.
    pub fn normalized_search(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Whether `item` passes every active filter dimension and the search text.
    pub fn accepts(&self, item: &F::Item) -> bool {
        self.filters.matches(item) && matches_search(&self.search_query, &F::search_fields(item))
    }

    /// Applies every active predicate to `items` and cuts out the current page.
    pub fn derive(&self, items: &[F::Item]) -> ListView<F::Item> {
        let filtered: Vec<F::Item> = items
            .iter()
            .filter(|item| self.accepts(item))
            .cloned()
            .collect();
        let filtered_count = filtered.len() as u64;
        ListView {
            items: page_slice(&filtered, self.current_page, self.page_size).to_vec(),
            current_page: self.current_page,
            total_pages: total_pages(filtered_count, self.page_size),
            filtered_count: Some(filtered_count),
        }
    }
}

/// Loading state of a list as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// A fetch is outstanding and nothing usable is shown yet
    #[default]
    Loading,
    /// The last fetch failed
    Error(String),
    /// Rows (possibly none) are available
    Ready,
}

/// The rows of the current page plus the numbers the pagination controls need.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub current_page: u64,
    pub total_pages: u64,
    /// Size of the whole filtered set; unknown for server-side lists
    pub filtered_count: Option<u64>,
}

impl<T> ListView<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What a list renders right now.
#[derive(Debug, PartialEq)]
pub enum ListDisplay<'a, T> {
    Loading,
    Error(&'a str),
    /// Ready but nothing matched; carries the placeholder row text
    Empty(&'static str),
    Rows(&'a [T]),
}

impl<'a, T> ListDisplay<'a, T> {
    /// Picks the display for a load state and the rows of the current page.
    pub fn from_parts(load: &'a LoadState, rows: &'a [T]) -> Self {
        match load {
            LoadState::Loading => Self::Loading,
            LoadState::Error(message) => Self::Error(message),
            LoadState::Ready if rows.is_empty() => Self::Empty(NO_RECORDS),
            LoadState::Ready => Self::Rows(rows),
        }
    }
}
